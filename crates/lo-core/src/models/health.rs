use std::time::Duration;

use serde::Serialize;

/// A single observation of a container's runtime status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    NotFound,
    Other(String),
}

impl ContainerState {
    /// Interpret the runtime's status string (`running`, `created`, ...).
    pub fn from_status(status: &str) -> Self {
        let status = status.trim();
        if status.is_empty() {
            ContainerState::NotFound
        } else if status.eq_ignore_ascii_case("running") {
            ContainerState::Running
        } else {
            ContainerState::Other(status.to_string())
        }
    }
}

/// Terminal result of a health gate.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum HealthState {
    Ready,
    /// The container was never observed during the whole window.
    NotFound,
    /// The container existed but never reached `running`.
    #[serde(rename_all = "camelCase")]
    Starting { last_state: String },
    /// Every probe failed, so nothing is known about the container.
    TimedOut,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthOutcome {
    pub container: String,
    #[serde(serialize_with = "duration_secs::serialize")]
    pub elapsed: Duration,
    pub state: HealthState,
}

impl HealthOutcome {
    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Ready
    }
}

pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}
