mod common;

use std::time::Duration;

use lo_core::models::{ContainerState, HealthState};
use lo_core::services::health_gate::HealthGate;

use common::FakeRuntime;

#[tokio::test(start_paused = true)]
async fn returns_as_soon_as_running() {
    let runtime = FakeRuntime::new();
    runtime.script(
        "web",
        vec![
            ContainerState::NotFound,
            ContainerState::Other("created".into()),
            ContainerState::Running,
        ],
    );

    let outcome = HealthGate::default().wait_for_running(&runtime, "web").await;
    assert!(outcome.is_healthy());
    assert!(outcome.elapsed >= Duration::from_secs(4));
    assert!(outcome.elapsed < Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn running_immediately_takes_no_time() {
    let runtime = FakeRuntime::new();
    runtime.running("web");

    let outcome = HealthGate::default().wait_for_running(&runtime, "web").await;
    assert_eq!(outcome.state, HealthState::Ready);
    assert_eq!(outcome.elapsed, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn missing_container_waits_full_timeout() {
    let runtime = FakeRuntime::new();

    let outcome = HealthGate::default().wait_for_running(&runtime, "typo").await;
    assert_eq!(outcome.state, HealthState::NotFound);
    assert!(outcome.elapsed >= Duration::from_secs(60));
    assert!(outcome.elapsed < Duration::from_secs(62));
}

#[tokio::test(start_paused = true)]
async fn stuck_container_reports_last_state() {
    let runtime = FakeRuntime::new();
    runtime.script("db", vec![ContainerState::Other("restarting".into())]);

    let gate = HealthGate {
        interval: Duration::from_secs(2),
        timeout: Duration::from_secs(10),
    };
    let outcome = gate.wait_for_running(&runtime, "db").await;
    assert_eq!(
        outcome.state,
        HealthState::Starting {
            last_state: "restarting".into()
        }
    );
    assert!(outcome.elapsed >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn timeout_not_multiple_of_interval_is_still_honoured() {
    let runtime = FakeRuntime::new();
    let gate = HealthGate {
        interval: Duration::from_secs(2),
        timeout: Duration::from_secs(5),
    };
    let outcome = gate.wait_for_running(&runtime, "ghost").await;
    assert!(outcome.elapsed >= Duration::from_secs(5));
    assert!(outcome.elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn probe_errors_end_in_timed_out() {
    let runtime = FakeRuntime::new();
    runtime.probe_error("api");

    let gate = HealthGate::with_timeout(Duration::from_secs(6));
    let outcome = gate.wait_for_running(&runtime, "api").await;
    assert_eq!(outcome.state, HealthState::TimedOut);
    assert!(!outcome.is_healthy());
}

#[tokio::test(start_paused = true)]
async fn running_at_the_deadline_counts() {
    let runtime = FakeRuntime::new();
    runtime.script(
        "gateway",
        vec![
            ContainerState::NotFound,
            ContainerState::NotFound,
            ContainerState::NotFound,
            ContainerState::Running,
        ],
    );
    let gate = HealthGate {
        interval: Duration::from_secs(2),
        timeout: Duration::from_secs(5),
    };

    let outcome = gate.wait_for_running(&runtime, "gateway").await;
    assert_eq!(outcome.state, HealthState::Ready);
    assert_eq!(outcome.elapsed, Duration::from_secs(5));
}
