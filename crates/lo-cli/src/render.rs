use std::fmt::Write;

use lo_core::models::{
    DependencyKind, HealthState, LaunchPlan, LaunchReport, ReconciliationReport,
    ReconciliationStatus, ServiceRunStatus,
};

/// One-line outcome of a run.
pub fn summary_line(report: &LaunchReport) -> String {
    let attempted = report
        .services
        .iter()
        .filter(|s| s.status != ServiceRunStatus::Disabled)
        .count();
    let reconciled: usize = report.networks.iter().map(|n| n.reconciled()).sum();
    let networks: usize = report.networks.iter().map(|n| n.total()).sum();
    format!(
        "services {}/{} healthy, networks {}/{} reconciled, {} agent endpoints{}",
        report.started_services().len(),
        attempted,
        reconciled,
        networks,
        report.agent_endpoints.len(),
        if report.aborted { " (aborted)" } else { "" }
    )
}

pub fn render_networks(report: &ReconciliationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} networks: {}/{} reconciled",
        report.scope,
        report.reconciled(),
        report.total()
    );
    for result in &report.results {
        let status = match &result.status {
            ReconciliationStatus::AlreadyExisted => "exists".to_string(),
            ReconciliationStatus::Created => "created".to_string(),
            ReconciliationStatus::Failed(reason) => format!("FAILED: {reason}"),
        };
        let _ = writeln!(out, "  {:<24} {status}", result.network);
    }
    out
}

pub fn render_report(report: &LaunchReport) -> String {
    let mut out = String::new();
    for networks in &report.networks {
        out.push_str(&render_networks(networks));
    }
    if !report.services.is_empty() {
        out.push_str("services:\n");
    }
    for service in &report.services {
        let status = match &service.status {
            ServiceRunStatus::Healthy => "healthy".to_string(),
            ServiceRunStatus::Disabled => "disabled".to_string(),
            ServiceRunStatus::Skipped { blocked_by } => {
                format!("skipped (blocked by {})", blocked_by.join(", "))
            }
            ServiceRunStatus::StartFailed { error } => format!("start failed: {error}"),
            ServiceRunStatus::Unhealthy { outcome } => {
                let reason = match &outcome.state {
                    HealthState::Ready => "ready".to_string(),
                    HealthState::NotFound => "not found".to_string(),
                    HealthState::Starting { last_state } => format!("stuck in {last_state}"),
                    HealthState::TimedOut => "runtime unreachable".to_string(),
                };
                format!(
                    "unhealthy: {} {reason} after {:.0}s",
                    outcome.container,
                    outcome.elapsed.as_secs_f64()
                )
            }
            ServiceRunStatus::NotReady { error } => format!("not ready: {error}"),
        };
        let _ = writeln!(
            out,
            "  [{}] {:<20} {status}",
            service.stage, service.service
        );
    }
    if !report.agent_endpoints.is_empty() {
        out.push_str("agent endpoints:\n");
        for endpoint in &report.agent_endpoints {
            let _ = writeln!(out, "  {:<20} {}", endpoint.agent_id, endpoint.url);
        }
    }
    out.push_str(&summary_line(report));
    out.push('\n');
    out
}

pub fn render_plan(plan: &LaunchPlan) -> String {
    let mut out = String::new();
    for service in plan.services() {
        let mut line = format!(
            "[{}] {} -> {} ({})",
            service.stage,
            service.name,
            service.manifest.display(),
            service.namespace
        );
        if !service.health_checks.is_empty() {
            let _ = write!(line, " checks={}", service.health_checks.join(","));
        }
        if service.startup_delay_secs > 0 {
            let _ = write!(line, " delay={}s", service.startup_delay_secs);
        }
        for dep in &service.depends_on {
            let kind = match dep.kind {
                DependencyKind::Hard => "hard",
                DependencyKind::Soft => "soft",
            };
            let _ = write!(line, " after={}({kind})", dep.service);
        }
        if !service.enabled {
            line.push_str(" [disabled]");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
