use std::collections::BTreeSet;

use crate::models::{
    LaunchConfig, ReconciliationReport, ReconciliationResult, ReconciliationStatus,
};

use super::network_scanner::TopologyScan;
use super::runtime::ContainerRuntime;

/// Ensure every named network exists. Check first, create only when absent.
/// Failures are recorded in the report and never abort the remaining
/// networks.
pub async fn reconcile<R, I, S>(runtime: &R, scope: &str, names: I) -> ReconciliationReport
where
    R: ContainerRuntime + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
    let mut report = ReconciliationReport::new(scope);

    for network in names {
        let status = reconcile_one(runtime, &network).await;
        report.results.push(ReconciliationResult { network, status });
    }

    if report.is_complete() {
        tracing::info!(
            scope,
            created = report.created(),
            existing = report.already_existed(),
            "reconciled {}/{} networks",
            report.reconciled(),
            report.total()
        );
    } else {
        tracing::error!(
            scope,
            failed = report.failed(),
            "reconciled {}/{} networks",
            report.reconciled(),
            report.total()
        );
    }
    report
}

async fn reconcile_one<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    network: &str,
) -> ReconciliationStatus {
    match runtime.network_exists(network).await {
        Ok(true) => {
            tracing::info!(network, "network already exists");
            return ReconciliationStatus::AlreadyExisted;
        }
        Ok(false) => {}
        Err(e) => {
            // Fall through to create; it either succeeds or reports why.
            tracing::warn!(network, error = %e, "could not query network, attempting create");
        }
    }

    match runtime.create_network(network).await {
        Ok(()) => {
            tracing::info!(network, "created network");
            ReconciliationStatus::Created
        }
        Err(e) if e.to_string().contains("already exists") => {
            tracing::info!(network, "network created concurrently");
            ReconciliationStatus::AlreadyExisted
        }
        Err(e) => {
            tracing::error!(network, error = %e, "failed to create network");
            ReconciliationStatus::Failed(e.to_string())
        }
    }
}

/// Reconcile the fixed platform network set.
pub async fn ensure_core_networks<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    config: &LaunchConfig,
) -> ReconciliationReport {
    reconcile(runtime, "core", config.core_networks()).await
}

/// Reconcile the external networks discovered in agent manifests.
pub async fn ensure_agent_networks<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    scan: &TopologyScan,
) -> ReconciliationReport {
    reconcile(runtime, "agents", scan.external_network_names()).await
}
