use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::endpoint::AgentEndpoint;
use super::health::{duration_secs, HealthOutcome};
use super::network::ReconciliationReport;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ServiceRunStatus {
    Healthy,
    /// `enabled: false` in the plan; never started.
    Disabled,
    /// A hard dependency did not come up.
    #[serde(rename_all = "camelCase")]
    Skipped { blocked_by: Vec<String> },
    #[serde(rename_all = "camelCase")]
    StartFailed { error: String },
    Unhealthy { outcome: HealthOutcome },
    NotReady { error: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOutcome {
    pub service: String,
    pub stage: u32,
    pub status: ServiceRunStatus,
    pub health: Vec<HealthOutcome>,
    #[serde(serialize_with = "duration_secs::serialize")]
    pub elapsed: Duration,
}

impl ServiceOutcome {
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceRunStatus::Healthy
    }

    /// Disabled services do not count against the run.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self.status,
            ServiceRunStatus::Healthy | ServiceRunStatus::Disabled
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReport {
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub networks: Vec<ReconciliationReport>,
    pub services: Vec<ServiceOutcome>,
    pub agent_endpoints: Vec<AgentEndpoint>,
    pub aborted: bool,
}

impl LaunchReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            networks: Vec::new(),
            services: Vec::new(),
            agent_endpoints: Vec::new(),
            aborted: false,
        }
    }

    pub fn networks_complete(&self) -> bool {
        self.networks.iter().all(|n| n.is_complete())
    }

    pub fn is_success(&self) -> bool {
        !self.aborted && self.networks_complete() && !self.services.iter().any(|s| s.is_failure())
    }

    pub fn started_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|s| s.is_healthy())
            .map(|s| s.service.as_str())
            .collect()
    }

    pub fn failed_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|s| s.is_failure())
            .map(|s| s.service.as_str())
            .collect()
    }

    pub fn outcome(&self, service: &str) -> Option<&ServiceOutcome> {
        self.services.iter().find(|s| s.service == service)
    }
}

impl Default for LaunchReport {
    fn default() -> Self {
        Self::new()
    }
}
