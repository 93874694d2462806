#![allow(dead_code)]

use std::time::Duration;

use lo_core::models::{
    AddressSource, AgentEndpoint, HealthOutcome, HealthState, LaunchReport,
    ReconciliationReport, ReconciliationResult, ReconciliationStatus, ServiceOutcome,
    ServiceRunStatus,
};

pub fn networks(scope: &str, results: &[(&str, ReconciliationStatus)]) -> ReconciliationReport {
    let mut report = ReconciliationReport::new(scope);
    for (network, status) in results {
        report.results.push(ReconciliationResult {
            network: network.to_string(),
            status: status.clone(),
        });
    }
    report
}

pub fn outcome(service: &str, stage: u32, status: ServiceRunStatus) -> ServiceOutcome {
    ServiceOutcome {
        service: service.to_string(),
        stage,
        status,
        health: Vec::new(),
        elapsed: Duration::from_secs(3),
    }
}

pub fn unhealthy(container: &str, state: HealthState, secs: u64) -> ServiceRunStatus {
    ServiceRunStatus::Unhealthy {
        outcome: HealthOutcome {
            container: container.to_string(),
            elapsed: Duration::from_secs(secs),
            state,
        },
    }
}

pub fn endpoint(agent_id: &str) -> AgentEndpoint {
    AgentEndpoint {
        agent_id: agent_id.to_string(),
        url: format!("http://10.0.0.5:9100/{agent_id}"),
        source: AddressSource::Interface,
    }
}

/// A finished run: core networks reconciled, backend and gateway healthy,
/// web stuck, model server disabled.
pub fn sample_report() -> LaunchReport {
    let mut report = LaunchReport::new();
    report.networks.push(networks(
        "core",
        &[
            ("agents-net", ReconciliationStatus::Created),
            ("app-network", ReconciliationStatus::AlreadyExisted),
        ],
    ));
    report.services = vec![
        outcome("backend", 1, ServiceRunStatus::Healthy),
        outcome("gateway", 2, ServiceRunStatus::Healthy),
        outcome(
            "web",
            3,
            unhealthy(
                "web",
                HealthState::Starting {
                    last_state: "restarting".into(),
                },
                60,
            ),
        ),
        outcome("model-server", 4, ServiceRunStatus::Disabled),
    ];
    report.agent_endpoints = vec![endpoint("summarizer"), endpoint("translator")];
    report
}
