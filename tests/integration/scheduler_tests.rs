//! Integration tests for the autolog scheduler against mock ports.
//!
//! Time is driven by [`ManualClock`]; suspension points are driven by the
//! gated sensor and journal, so every interleaving below is deterministic.

use chrono::Duration;
use futures_lite::future::{block_on, zip};

use tankwatch::scheduler::{ActivityType, AutologScheduler, AutologState, TickOutcome};
use tankwatch::{Error, StartFailure};

use crate::mock_ports::{ManualClock, MockJournal, MockSensor, liter_per_cm_tank, t0};

fn armed_at(liters: f64) -> (AutologScheduler, MockSensor, MockJournal, ManualClock) {
    let sched = AutologScheduler::new();
    let sensor = MockSensor::at_liters(liters);
    let journal = MockJournal::new();
    let clock = ManualClock::new();
    block_on(sched.start(&liter_per_cm_tank(), &sensor, &clock)).unwrap();
    (sched, sensor, journal, clock)
}

// ── Delta detection ───────────────────────────────────────────

#[test]
fn small_change_then_refill_is_logged_against_latest_baseline() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(10.4);
    clock.advance_secs(60);
    let out = block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert!(matches!(out, TickOutcome::Sampled { logged: None, .. }));
    assert_eq!(journal.len(), 0);

    sensor.set_liters(11.5);
    clock.advance_secs(60);
    block_on(sched.tick(&sensor, &journal, &clock)).unwrap();

    let entry = journal.last().expect("refill logged");
    assert_eq!(entry.activity_type, ActivityType::Refill);
    assert_eq!(entry.amount_liters, 1.1);
    assert_eq!(entry.timestamp, t0() + Duration::seconds(120));
}

#[test]
fn drop_in_level_is_logged_as_usage() {
    let (sched, sensor, journal, clock) = armed_at(50.0);

    sensor.set_liters(47.0);
    clock.advance_secs(60);
    let out = block_on(sched.tick(&sensor, &journal, &clock)).unwrap();

    let TickOutcome::Sampled {
        logged: Some(entry),
        ..
    } = out
    else {
        panic!("expected a logged sample, got {out:?}");
    };
    assert_eq!(entry.activity_type, ActivityType::Usage);
    assert_eq!(entry.amount_liters, 3.0);
    assert_eq!(journal.len(), 1);
}

#[test]
fn change_exactly_at_minimum_is_logged() {
    let (sched, sensor, journal, clock) = armed_at(20.0);

    sensor.set_liters(21.0);
    clock.advance_secs(60);
    block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(journal.len(), 1);
}

#[test]
fn identical_readings_never_log_but_advance_baseline() {
    let (sched, sensor, journal, clock) = armed_at(30.0);

    for n in 1..=5 {
        clock.advance_secs(60);
        block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
        let baseline = sched.baseline().unwrap();
        assert_eq!(baseline.liters, 30.0);
        assert_eq!(baseline.captured_at, t0() + Duration::seconds(60 * n));
    }
    assert_eq!(journal.len(), 0);
    assert_eq!(sensor.reads.get(), 6);
}

// ── Deadline ──────────────────────────────────────────────────

#[test]
fn ticks_before_deadline_only_count_down() {
    let (sched, sensor, journal, clock) = armed_at(30.0);

    clock.advance_secs(59);
    let out = block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(out, TickOutcome::Waiting { remaining_secs: 1 });
    assert_eq!(sched.status().countdown_display(), "00:01");
    assert_eq!(sensor.reads.get(), 1);
}

#[test]
fn late_tick_reschedules_from_tick_time() {
    let (sched, sensor, journal, clock) = armed_at(30.0);

    clock.advance_secs(90);
    block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(sched.deadline(), Some(t0() + Duration::seconds(150)));

    // One sample per crossing: the next tick is a countdown again.
    let out = block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(out, TickOutcome::Waiting { remaining_secs: 60 });
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn log_write_failure_still_advances_baseline() {
    let (sched, sensor, journal, clock) = armed_at(40.0);
    journal.set_failing(true);

    sensor.set_liters(35.0);
    clock.advance_secs(60);
    let err = block_on(sched.tick(&sensor, &journal, &clock)).unwrap_err();
    assert_eq!(err, Error::LogWriteFailed);
    assert_eq!(sched.state(), AutologState::Armed);
    assert_eq!(sched.baseline().unwrap().liters, 35.0);

    // The lost change is not re-logged at the next deadline.
    journal.set_failing(false);
    clock.advance_secs(60);
    block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(journal.len(), 0);
}

#[test]
fn sensor_failure_at_deadline_keeps_baseline_and_rearms() {
    let (sched, sensor, journal, clock) = armed_at(40.0);

    sensor.fail();
    clock.advance_secs(60);
    let err = block_on(sched.tick(&sensor, &journal, &clock)).unwrap_err();
    assert_eq!(err, Error::SensorUnavailable);
    assert_eq!(sched.state(), AutologState::Armed);
    assert_eq!(sched.baseline().unwrap().liters, 40.0);
    assert_eq!(sched.deadline(), Some(t0() + Duration::seconds(120)));

    sensor.set_liters(38.0);
    clock.advance_secs(60);
    block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(journal.last().unwrap().amount_liters, 2.0);
}

#[test]
fn start_with_missing_sensor_stays_stopped() {
    let sched = AutologScheduler::new();
    let sensor = MockSensor::at_liters(10.0);
    sensor.fail();

    let err = block_on(sched.start(&liter_per_cm_tank(), &sensor, &ManualClock::new()))
        .unwrap_err();
    assert_eq!(
        err,
        Error::SchedulerStartFailed(StartFailure::SensorUnavailable)
    );
    assert_eq!(sched.state(), AutologState::Stopped);
}

#[test]
fn start_with_bad_dimensions_reports_cause() {
    let sched = AutologScheduler::new();
    let mut settings = liter_per_cm_tank();
    settings.dimensions.width_cm = None;

    let err = block_on(sched.start(
        &settings,
        &MockSensor::at_liters(10.0),
        &ManualClock::new(),
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        Error::SchedulerStartFailed(StartFailure::InvalidDimensions(_))
    ));
}

// ── Interleavings ─────────────────────────────────────────────

#[test]
fn stop_during_in_flight_read_discards_sample() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(20.0);
    sensor.hold();
    clock.advance_secs(60);

    let (out, ()) = block_on(zip(sched.tick(&sensor, &journal, &clock), async {
        sched.stop();
        sensor.release();
    }));

    assert_eq!(out.unwrap(), TickOutcome::Discarded);
    assert_eq!(sched.state(), AutologState::Stopped);
    assert_eq!(journal.len(), 0);
}

#[test]
fn restart_during_in_flight_read_keeps_new_baseline() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(20.0);
    sensor.hold();
    clock.advance_secs(60);

    let settings = liter_per_cm_tank();
    let (out, restarted) = block_on(zip(sched.tick(&sensor, &journal, &clock), async {
        sched.stop();
        sensor.release();
        sched.start(&settings, &sensor, &clock).await
    }));

    restarted.unwrap();
    assert_eq!(out.unwrap(), TickOutcome::Discarded);
    assert_eq!(sched.state(), AutologState::Armed);
    assert_eq!(sched.baseline().unwrap().liters, 20.0);
    assert_eq!(journal.len(), 0);
}

#[test]
fn reentrant_tick_reports_busy() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(12.0);
    sensor.hold();
    clock.advance_secs(60);

    let (first, second) = block_on(zip(sched.tick(&sensor, &journal, &clock), async {
        let second = sched.tick(&sensor, &journal, &clock).await;
        sensor.release();
        second
    }));

    assert_eq!(second.unwrap(), TickOutcome::Busy);
    assert!(matches!(
        first.unwrap(),
        TickOutcome::Sampled {
            logged: Some(_),
            ..
        }
    ));
    assert_eq!(journal.len(), 1);
    assert_eq!(sensor.reads.get(), 2);
}

#[test]
fn stop_during_log_write_does_not_rearm() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(15.0);
    journal.hold();
    clock.advance_secs(60);

    let (out, ()) = block_on(zip(sched.tick(&sensor, &journal, &clock), async {
        sched.stop();
        journal.release();
    }));

    assert_eq!(out.unwrap(), TickOutcome::Discarded);
    assert_eq!(sched.state(), AutologState::Stopped);
    // The write itself had already been issued.
    assert_eq!(journal.len(), 1);
}

#[test]
fn restart_during_slow_log_write_counts_down_new_schedule() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(15.0);
    journal.hold();
    clock.advance_secs(60);

    let (old, new) = block_on(zip(sched.tick(&sensor, &journal, &clock), async {
        sched.stop();
        sched
            .start(&liter_per_cm_tank(), &sensor, &clock)
            .await
            .unwrap();
        let new = sched.tick(&sensor, &journal, &clock).await;
        journal.release();
        new
    }));

    assert_eq!(new.unwrap(), TickOutcome::Waiting { remaining_secs: 60 });
    assert_eq!(old.unwrap(), TickOutcome::Discarded);
    assert_eq!(sched.status().countdown_secs, 60);
    assert_eq!(sched.baseline().unwrap().liters, 15.0);

    // The old write landed; the new schedule keeps sampling normally.
    sensor.set_liters(20.0);
    clock.advance_secs(60);
    let out = block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert!(matches!(
        out,
        TickOutcome::Sampled {
            logged: Some(_),
            ..
        }
    ));
    assert_eq!(journal.len(), 2);
    assert_eq!(journal.last().unwrap().amount_liters, 5.0);
}

#[test]
fn stop_during_start_leaves_scheduler_stopped() {
    let sched = AutologScheduler::new();
    let sensor = MockSensor::at_liters(10.0);
    let clock = ManualClock::new();
    sensor.hold();

    let (started, ()) = block_on(zip(
        sched.start(&liter_per_cm_tank(), &sensor, &clock),
        async {
            sched.stop();
            sensor.release();
        },
    ));

    started.unwrap();
    assert_eq!(sched.state(), AutologState::Stopped);
    assert_eq!(sched.baseline(), None);
}

// ── Settings changes ──────────────────────────────────────────

#[test]
fn settings_change_restarts_baseline() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    sensor.set_liters(25.0);
    clock.advance_secs(30);
    let mut settings = liter_per_cm_tank();
    settings.autolog.interval_minutes = 2.0;
    block_on(sched.on_settings_changed(&settings, &sensor, &clock)).unwrap();

    let baseline = sched.baseline().unwrap();
    assert_eq!(baseline.liters, 25.0);
    assert_eq!(baseline.captured_at, t0() + Duration::seconds(30));
    assert_eq!(sched.deadline(), Some(t0() + Duration::seconds(150)));

    // The 15 L jump happened before the restart and is never logged.
    clock.advance_secs(120);
    block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(journal.len(), 0);
}

#[test]
fn disabling_in_settings_stops_scheduler() {
    let (sched, sensor, journal, clock) = armed_at(10.0);

    let mut settings = liter_per_cm_tank();
    settings.autolog.enabled = false;
    block_on(sched.on_settings_changed(&settings, &sensor, &clock)).unwrap();
    assert_eq!(sched.state(), AutologState::Stopped);

    clock.advance_secs(600);
    let out = block_on(sched.tick(&sensor, &journal, &clock)).unwrap();
    assert_eq!(out, TickOutcome::Stopped);
}
