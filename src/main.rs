//! Tank Watch host entry point.
//!
//! Hexagonal architecture on a single cooperative executor.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FileBackend            LogEventSink   SystemClock             │
//! │  (Sensor+Log+Settings)  (EventSink)    (Clock)                 │
//! │  MemorySettingsStore (--ephemeral)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              TankService (pure logic)                  │    │
//! │  │  Settings · Autolog scheduler · Threshold monitor      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Driver (tick · poll · command loops) · settings watcher       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::{info, warn};

use tankwatch::adapters::file::FileBackend;
use tankwatch::adapters::log_sink::LogEventSink;
use tankwatch::adapters::memory::MemorySettingsStore;
use tankwatch::adapters::time::SystemClock;
use tankwatch::app::commands::AppCommand;
use tankwatch::app::ports::{Clock, LogPort, SensorPort, SettingsPort};
use tankwatch::app::service::TankService;
use tankwatch::config::TankSettings;
use tankwatch::driver::{self, CommandChannel, DriverConfig, Ports, ShutdownSignal};
use tankwatch::journal::{self, LogFilter};
use tankwatch::scheduler::ActivityType;
use tankwatch::settings::SettingsModel;
use tankwatch::{level, threshold, usage};

// ── Statics shared with helper threads ───────────────────────

static COMMANDS: CommandChannel = Channel::new();
static SHUTDOWN: ShutdownSignal = Signal::new();

// ── CLI ──────────────────────────────────────────────────────

/// Water tank level monitor and auto-logger.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Directory holding settings.json, sensor.json and logs.jsonl
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Monitor the tank and auto-log level changes until stopped
    Run {
        /// Autolog tick period in milliseconds
        #[arg(long, default_value_t = 1_000)]
        tick_ms: u64,

        /// Level poll period in milliseconds
        #[arg(long, default_value_t = 2_000)]
        poll_ms: u64,

        /// Stop after this many seconds (runs forever when omitted)
        #[arg(long)]
        duration_secs: Option<u64>,

        /// Keep settings changes in memory instead of writing settings.json
        #[arg(long)]
        ephemeral: bool,
    },

    /// Print the current level estimate once
    Estimate,

    /// Print daily, weekly and monthly usage from the log journal
    Usage,

    /// Record a usage or refill by hand
    Log {
        #[arg(value_enum)]
        activity: Activity,

        /// Amount in liters (must be greater than zero)
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// List journal entries, newest first
    List {
        /// Only this activity type
        #[arg(long, value_enum)]
        activity: Option<Activity>,

        /// First day included (YYYY-MM-DD, local time)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day included (defaults to --from)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Activity {
    Usage,
    Refill,
}

impl From<Activity> for ActivityType {
    fn from(a: Activity) -> Self {
        match a {
            Activity::Usage => Self::Usage,
            Activity::Refill => Self::Refill,
        }
    }
}

// ── Main ─────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let backend = FileBackend::new(&cli.data_dir);

    match cli.command {
        Command::Run {
            tick_ms,
            poll_ms,
            duration_secs,
            ephemeral,
        } => {
            let config = DriverConfig {
                tick_period: Duration::from_millis(tick_ms),
                poll_period: Duration::from_millis(poll_ms),
            };
            run(&backend, config, duration_secs, ephemeral)
        }
        Command::Estimate => estimate(&backend),
        Command::Usage => print_usage(&backend),
        Command::Log { activity, amount } => log_manual(&backend, activity.into(), amount),
        Command::List { activity, from, to } => {
            let query = LogFilter {
                activity_type: activity.map(ActivityType::from),
                from,
                to,
            };
            list(&backend, &query)
        }
    }
}

fn load_settings(store: &impl SettingsPort) -> SettingsModel {
    match SettingsModel::load(store) {
        Ok(model) => {
            info!("Settings loaded");
            model
        }
        Err(e) => {
            warn!("Settings load failed ({}), using defaults", e);
            SettingsModel::default()
        }
    }
}

// ── run ──────────────────────────────────────────────────────

fn run(
    backend: &FileBackend,
    config: DriverConfig,
    duration_secs: Option<u64>,
    ephemeral: bool,
) -> Result<()> {
    info!("Tank Watch v{}", env!("CARGO_PKG_VERSION"));

    let model = load_settings(backend);
    spawn_settings_watcher(backend.dir(), model.current().clone(), config.poll_period);
    if let Some(secs) = duration_secs {
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            info!("Run duration elapsed, shutting down");
            SHUTDOWN.signal(());
        });
    }

    let service = TankService::new(model);
    let clock = SystemClock::new();
    let sink = LogEventSink::new();

    if ephemeral {
        let store = MemorySettingsStore::with_settings(&service.settings())
            .context("seeding in-memory settings store")?;
        drive(&service, backend, &store, &clock, &sink, config);
    } else {
        drive(&service, backend, backend, &clock, &sink, config);
    }
    Ok(())
}

fn drive(
    service: &TankService,
    io: &FileBackend,
    store: &impl SettingsPort,
    clock: &SystemClock,
    sink: &LogEventSink,
    config: DriverConfig,
) {
    let ports = Ports {
        io,
        store,
        clock,
        sink,
    };
    driver::run(service, &ports, config, &COMMANDS, &SHUTDOWN);
}

/// Forward edits of `settings.json` made by other processes as
/// [`AppCommand::UpdateSettings`].
fn spawn_settings_watcher(dir: &Path, initial: TankSettings, period: Duration) {
    let watcher = FileBackend::new(dir);
    thread::spawn(move || {
        let mut last = initial;
        loop {
            thread::sleep(period);
            let Ok(settings) = watcher.load() else {
                continue;
            };
            if settings == last {
                continue;
            }
            info!("Settings file changed, applying");
            last = settings.clone();
            if COMMANDS
                .try_send(AppCommand::UpdateSettings(settings))
                .is_err()
            {
                warn!("Command channel full, settings change dropped");
            }
        }
    });
}

// ── estimate ─────────────────────────────────────────────────

fn estimate(backend: &FileBackend) -> Result<()> {
    let model = load_settings(backend);
    let settings = model.current();
    let reading = futures_lite::future::block_on(backend.read()).context("reading sensor.json")?;
    let est = level::estimate(settings, &reading).context("estimating level")?;
    let below = threshold::is_below_threshold(settings, &est)?;

    println!(
        "{:.2} L of {:.2} L ({:.1}%)",
        est.rounded_liters(),
        est.capacity_liters,
        est.percent()
    );
    println!("water height: {:.1} cm", est.filled_height_cm);
    println!("temperature:  {:.1} \u{00b0}C", reading.temperature_c);
    println!(
        "read at:      {}",
        reading.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    if below {
        println!("LOW: level is below the alert threshold");
    }
    Ok(())
}

// ── usage ────────────────────────────────────────────────────

fn print_usage(backend: &FileBackend) -> Result<()> {
    let entries = backend.read_log().context("reading logs.jsonl")?;
    let now = Local::now();
    let summary = usage::summarize(&entries, &now);
    let by_day = usage::usage_by_weekday(&entries, &now);

    println!("today:      {:.2} L", summary.daily);
    println!("this week:  {:.2} L", summary.weekly);
    println!("this month: {:.2} L", summary.monthly);
    println!();

    let max = by_day.iter().copied().fold(0.0_f64, f64::max);
    let mut day = Weekday::Mon;
    for liters in by_day {
        let bar = if max > 0.0 {
            "#".repeat(((liters / max) * 30.0).round() as usize)
        } else {
            String::new()
        };
        println!("{:?}  {:>7.2} L  {}", day, liters, bar);
        day = day.succ();
    }
    Ok(())
}

// ── log / list ───────────────────────────────────────────────

fn log_manual(backend: &FileBackend, activity: ActivityType, amount: f64) -> Result<()> {
    let entry = journal::manual_entry(activity, amount, SystemClock::new().now())?;
    futures_lite::future::block_on(backend.write(&entry)).context("appending to logs.jsonl")?;
    info!("Logged {:?} of {:.2} L", entry.activity_type, entry.amount_liters);
    Ok(())
}

fn list(backend: &FileBackend, query: &LogFilter) -> Result<()> {
    let entries = backend.read_log().context("reading logs.jsonl")?;
    let listed = journal::filter(&entries, query, &Local);
    if listed.is_empty() {
        println!("no matching entries");
        return Ok(());
    }
    for entry in listed {
        println!(
            "{}  {:<6}  {:>8.2} L",
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            format!("{:?}", entry.activity_type),
            entry.amount_liters
        );
    }
    Ok(())
}
