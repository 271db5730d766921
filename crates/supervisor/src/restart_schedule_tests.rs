// SPDX-License-Identifier: MIT

use super::*;
use mcsup_adapters::{FakeLivenessProber, FakeProcessInspector, FakeSessionAdapter, Pid};
use mcsup_core::{DesiredState, FakeClock, JarName, Nick, TargetConfig};
use mcsup_scheduler::Scheduler;
use std::path::PathBuf;

fn target_config(restart_period: Duration) -> TargetConfig {
    TargetConfig {
        nick: Nick::from("test"),
        path: PathBuf::from("/srv/test"),
        jar: JarName::from("test.jar"),
        start_script: "start.sh".to_string(),
        enable_chatlog: false,
        enable_responsiveness_check: true,
        enable_automated_restarts: true,
        start_at_launch: true,
        multi_user: false,
        authorised_accounts: Vec::new(),
        host: "127.0.0.1".to_string(),
        port: 25565,
        startup_grace: Duration::from_secs(60),
        restart_period,
    }
}

// Scenario 1: cold start, well inside the restart period — the warning group
// lands at R-uptime-600/-300/-60 and the restart itself at R-uptime.
#[test]
fn normal_mode_offsets_are_relative_to_the_remaining_period() {
    let restart_period = Duration::from_secs(7200);
    let uptime = Duration::from_secs(10);
    let remaining = restart_period - uptime;

    let offsets = restart_offsets(uptime, restart_period);

    assert_eq!(
        offsets,
        [
            (remaining - TEN_MINUTES, Some(10)),
            (remaining - FIVE_MINUTES, Some(5)),
            (remaining - ONE_MINUTE, Some(1)),
            (remaining, None),
        ]
    );
}

// Scenario 2: the process has already run past the point where a full
// warning sequence still fits before the next restart — the whole sequence
// compresses into the next ten minutes: 0/+300/+540/+600.
#[test]
fn overdue_mode_compresses_the_warning_group_into_the_next_ten_minutes() {
    let restart_period = Duration::from_secs(3600);
    let uptime = Duration::from_secs(3600 - 60); // 1 minute short of the period

    let offsets = restart_offsets(uptime, restart_period);

    assert_eq!(
        offsets,
        [
            (Duration::ZERO, Some(10)),
            (Duration::from_secs(300), Some(5)),
            (Duration::from_secs(540), Some(1)),
            (Duration::from_secs(600), None),
        ]
    );
}

// The overdue-mode restart itself always lands strictly >= 10 minutes out,
// regardless of how far past the nominal restart period the process is.
#[test]
fn overdue_mode_restart_is_never_scheduled_sooner_than_ten_minutes_out() {
    let restart_period = Duration::from_secs(600);
    let uptime = Duration::from_secs(3600); // well past the configured period

    let offsets = restart_offsets(uptime, restart_period);

    assert_eq!(offsets[3], (TEN_MINUTES, None));
}

// A period under ten minutes must not underflow the `uptime + 10min >=
// period` comparison or the offset subtraction.
#[test]
fn short_restart_period_does_not_underflow() {
    let restart_period = Duration::from_secs(30);
    let uptime = Duration::from_secs(5);

    let offsets = restart_offsets(uptime, restart_period);

    assert_eq!(
        offsets,
        [
            (Duration::ZERO, Some(10)),
            (Duration::from_secs(300), Some(5)),
            (Duration::from_secs(540), Some(1)),
            (Duration::from_secs(600), None),
        ]
    );
}

#[test]
fn warning_text_uses_singular_minute_only_for_one() {
    assert_eq!(
        restart_warning_text(1),
        "say An automated restart will occur in 1 minute."
    );
    assert_eq!(
        restart_warning_text(5),
        "say An automated restart will occur in 5 minutes."
    );
    assert_eq!(
        restart_warning_text(10),
        "say An automated restart will occur in 10 minutes."
    );
}

type TestSupervisor = Supervisor<FakeProcessInspector, FakeSessionAdapter, FakeLivenessProber, FakeClock>;

fn build(restart_period: Duration) -> (Arc<TestSupervisor>, FakeProcessInspector) {
    let processes = FakeProcessInspector::new();
    let session = FakeSessionAdapter::new();
    let liveness = FakeLivenessProber::new();
    let scheduler = Scheduler::new(FakeClock::new());
    let supervisor = Supervisor::new(
        target_config(restart_period),
        DesiredState::Online,
        processes.clone(),
        session,
        liveness,
        scheduler,
    );
    (supervisor, processes)
}

#[tokio::test]
async fn schedule_restarts_locked_enters_four_events_when_a_pid_is_observed() {
    let (supervisor, processes) = build(Duration::from_secs(7200));
    processes.spawn(Pid(1), "test.jar", Duration::from_secs(10), "java -jar test.jar");

    let mut inner = supervisor.inner.lock().await;
    supervisor.schedule_restarts_locked(&mut inner).await;

    assert_eq!(inner.restart_events.len(), 4);
}

// Grounded on the guard that skips scheduling entirely (rather than
// defaulting to a zero uptime) when no PID yields a usable uptime.
#[tokio::test]
async fn schedule_restarts_locked_leaves_the_group_empty_when_uptime_is_unavailable() {
    let (supervisor, _processes) = build(Duration::from_secs(7200));

    let mut inner = supervisor.inner.lock().await;
    supervisor.schedule_restarts_locked(&mut inner).await;

    assert!(inner.restart_events.is_empty());
}

#[tokio::test]
async fn schedule_restarts_locked_is_a_noop_when_automated_restarts_are_disabled() {
    let mut config = target_config(Duration::from_secs(7200));
    config.enable_automated_restarts = false;
    let processes = FakeProcessInspector::new();
    let session = FakeSessionAdapter::new();
    let liveness = FakeLivenessProber::new();
    let scheduler = Scheduler::new(FakeClock::new());
    let supervisor = Supervisor::new(config, DesiredState::Online, processes.clone(), session, liveness, scheduler);
    processes.spawn(Pid(1), "test.jar", Duration::from_secs(10), "java -jar test.jar");

    let mut inner = supervisor.inner.lock().await;
    supervisor.schedule_restarts_locked(&mut inner).await;

    assert!(inner.restart_events.is_empty());
}
