use std::time::Duration;

use tokio::time::Instant;

use crate::models::{ContainerState, HealthOutcome, HealthState};

use super::runtime::ContainerRuntime;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Bounded liveness check: polls a container until it reports `running`.
///
/// This only says the container process started. It says nothing about the
/// service inside accepting traffic; use a readiness probe for that.
#[derive(Debug, Clone, Copy)]
pub struct HealthGate {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HealthGate {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HealthGate {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Returns as soon as `running` is observed. Otherwise keeps polling
    /// until the full timeout has elapsed; never returns early with a
    /// negative outcome and never raises.
    pub async fn wait_for_running<R: ContainerRuntime + ?Sized>(
        &self,
        runtime: &R,
        container: &str,
    ) -> HealthOutcome {
        tracing::info!(container, timeout_secs = self.timeout.as_secs(), "waiting for container to be running");
        let start = Instant::now();
        let mut last_seen: Option<String> = None;
        let mut observed_missing = false;

        loop {
            match runtime.container_state(container).await {
                Ok(ContainerState::Running) => {
                    let elapsed = start.elapsed();
                    tracing::info!(container, elapsed_secs = elapsed.as_secs_f64(), "container is running");
                    return HealthOutcome {
                        container: container.to_string(),
                        elapsed,
                        state: HealthState::Ready,
                    };
                }
                Ok(ContainerState::NotFound) => {
                    observed_missing = true;
                    tracing::debug!(container, "container not found yet");
                }
                Ok(ContainerState::Other(state)) => {
                    tracing::debug!(container, state = %state, "container not running yet");
                    last_seen = Some(state);
                }
                Err(e) => {
                    tracing::debug!(container, error = %e, "status probe failed");
                }
            }

            // The last sleep is clipped to the deadline, where one final
            // probe still runs.
            let remaining = self.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(remaining.min(self.interval)).await;
        }

        let elapsed = start.elapsed();
        let state = match (last_seen, observed_missing) {
            (Some(last_state), _) => HealthState::Starting { last_state },
            (None, true) => HealthState::NotFound,
            (None, false) => HealthState::TimedOut,
        };
        tracing::error!(
            container,
            elapsed_secs = elapsed.as_secs_f64(),
            outcome = ?state,
            "container did not become running within {}s",
            self.timeout.as_secs()
        );
        HealthOutcome {
            container: container.to_string(),
            elapsed,
            state,
        }
    }
}
