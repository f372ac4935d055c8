//! Async driver: reactor-driven tick, poll and command loops.
//!
//! Runs the [`TankService`] on a single `edge-executor` with
//! `async-io-mini` timers.  Three concurrent tasks share the service by
//! reference:
//!
//! 1. **Tick**: runs one autolog tick every `tick_period`
//! 2. **Poll**: reads the sensor and evaluates the alert every `poll_period`
//! 3. **Command**: wakes on [`CommandChannel`] and applies the command
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on                                  │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                      │  │
//!  │  │                                                    │  │
//!  │  │  ┌─────────┐  ┌──────────┐  ┌──────────────────┐   │  │
//!  │  │  │  Tick   │  │  Poll    │  │ Command (async)  │   │  │
//!  │  │  │  1s ⏱   │  │  2s ⏱    │  │ wake-on-send     │   │  │
//!  │  │  └─────────┘  └──────────┘  └──────────────────┘   │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  │            until ShutdownSignal fires                     │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler serializes ticks itself, so a slow sensor never produces
//! two concurrent samples even when the tick period is shorter than a read.

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::{debug, info, warn};

use crate::app::commands::AppCommand;
use crate::app::ports::{Clock, EventSink, LogPort, SensorPort, SettingsPort};
use crate::app::service::TankService;
use crate::error::Error;
use crate::scheduler::TickOutcome;

/// Channel depth for inbound commands.
const CMD_DEPTH: usize = 4;

/// Inbound commands: settings form / CLI → driver.
pub type CommandChannel = Channel<CriticalSectionRawMutex, AppCommand, CMD_DEPTH>;

/// Fired once to stop [`run`].
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

/// Loop periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// How often the autolog deadline is checked.
    pub tick_period: Duration,
    /// How often the level is read for display and alerts.
    pub poll_period: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            poll_period: Duration::from_secs(2),
        }
    }
}

/// Everything the loops talk to.
pub struct Ports<'a, IO, S, C, E> {
    pub io: &'a IO,
    pub store: &'a S,
    pub clock: &'a C,
    pub sink: &'a E,
}

// ── Loops ────────────────────────────────────────────────────

async fn tick_loop<IO, S, C, E>(
    service: &TankService,
    ports: &Ports<'_, IO, S, C, E>,
    period: Duration,
) where
    IO: SensorPort + LogPort,
    C: Clock,
    E: EventSink,
{
    loop {
        async_io_mini::Timer::after(period).await;
        match service.tick(ports.io, ports.clock, ports.sink).await {
            Ok(TickOutcome::Waiting { remaining_secs }) => {
                debug!("Driver: next autolog sample in {}s", remaining_secs);
            }
            Ok(TickOutcome::Busy) => debug!("Driver: tick skipped, sample in flight"),
            Ok(_) => {}
            Err(e) => warn!("Driver: autolog tick failed: {}", e),
        }
    }
}

async fn poll_loop<IO, S, C, E>(
    service: &TankService,
    ports: &Ports<'_, IO, S, C, E>,
    period: Duration,
) where
    IO: SensorPort,
    E: EventSink,
{
    loop {
        match service.poll_level(ports.io, ports.sink).await {
            Ok(_) => {}
            Err(Error::SensorUnavailable) => debug!("Driver: no reading yet"),
            Err(e) => warn!("Driver: level poll failed: {}", e),
        }
        async_io_mini::Timer::after(period).await;
    }
}

async fn command_loop<IO, S, C, E>(
    service: &TankService,
    ports: &Ports<'_, IO, S, C, E>,
    commands: &CommandChannel,
) where
    IO: SensorPort,
    S: SettingsPort,
    C: Clock,
    E: EventSink,
{
    loop {
        let cmd = commands.receive().await;
        debug!("Driver: command {:?}", cmd);
        match service
            .handle_command(cmd, ports.io, ports.store, ports.clock, ports.sink)
            .await
        {
            Ok(()) => {}
            // Settings were accepted and persisted; only the re-arm failed.
            Err(Error::SchedulerStartFailed(cause)) => {
                warn!("Driver: command applied, autolog not armed: {}", cause);
            }
            Err(e) => warn!("Driver: command rejected: {}", e),
        }
    }
}

// ── Entry point ──────────────────────────────────────────────

/// Start the service, then drive the three loops until `shutdown` fires.
///
/// A failed autolog start is not fatal: the service keeps polling and a
/// later [`AppCommand::RetryAutolog`] or settings change re-arms it.
pub fn run<IO, S, C, E>(
    service: &TankService,
    ports: &Ports<'_, IO, S, C, E>,
    config: DriverConfig,
    commands: &CommandChannel,
    shutdown: &ShutdownSignal,
) where
    IO: SensorPort + LogPort,
    S: SettingsPort,
    C: Clock,
    E: EventSink,
{
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    executor
        .spawn(tick_loop(service, ports, config.tick_period))
        .detach();
    executor
        .spawn(poll_loop(service, ports, config.poll_period))
        .detach();
    executor.spawn(command_loop(service, ports, commands)).detach();

    info!(
        "Driver started (tick {:?}, poll {:?})",
        config.tick_period, config.poll_period
    );

    futures_lite::future::block_on(executor.run(async {
        if let Err(e) = service.start(ports.io, ports.clock, ports.sink).await {
            warn!("Driver: autolog not armed at startup: {}", e);
        }
        shutdown.wait().await;
    }));

    service.scheduler().stop();
    info!("Driver stopped");
}
