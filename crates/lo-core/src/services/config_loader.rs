use std::path::{Path, PathBuf};

use crate::error::{OrchestratorError, Result};
use crate::models::{
    DependencyKind, LaunchConfig, LaunchPlan, LogProbe, ReadinessProbe, ServiceDescriptor,
};

pub const PLAN_FILENAME: &str = ".launch-plan.yaml";

/// Load the plan from `<root>/.launch-plan.yaml`, or the built-in plan when
/// that file does not exist.
pub fn load_plan(config: &LaunchConfig) -> Result<LaunchPlan> {
    let path = config.root.join(PLAN_FILENAME);
    if !path.exists() {
        tracing::info!(path = %path.display(), "no plan file, using default launch plan");
        return default_plan(config);
    }
    load_plan_file(&path)
}

/// Load an explicitly named plan file; a missing file is an error.
pub fn load_plan_file(path: &Path) -> Result<LaunchPlan> {
    if !path.exists() {
        return Err(OrchestratorError::ConfigNotFound(PathBuf::from(path)));
    }
    let contents = std::fs::read_to_string(path)?;
    let plan = LaunchPlan::from_yaml(&contents)?;
    tracing::info!(path = %path.display(), services = plan.services().len(), "loaded launch plan");
    Ok(plan)
}

/// The platform's standard bring-up order.
pub fn default_plan(config: &LaunchConfig) -> Result<LaunchPlan> {
    let observability = ServiceDescriptor::new(
        "observability",
        "observability/langtrace/docker-compose.langtrace.yaml",
        "observability",
        1,
    )
    .with_health_check("langtrace")
    .with_delay(20);

    let mut backend = ServiceDescriptor::new("backend", "app/docker-compose.app.yaml", "app", 2)
        .with_health_check("backend")
        .depends_on("observability", DependencyKind::Soft);
    backend.readiness = Some(ReadinessProbe {
        url: format!(
            "{}/api/v1/healthcheck",
            config.backend_api_url.trim_end_matches('/')
        ),
        attempts: 10,
        interval_secs: 30,
    });

    let mut gateway = ServiceDescriptor::new("gateway", "gateway/docker-compose.yml", "gateway", 3)
        .with_health_check("gateway-database")
        .with_health_check("gateway")
        .with_delay(10)
        .depends_on("backend", DependencyKind::Soft);
    gateway.log_probe = Some(LogProbe {
        container: "gateway-migrations".into(),
        settle_secs: 5,
    });
    gateway.publishes_agent_routes = true;

    let web = ServiceDescriptor::new("web", "web/docker-compose.yml", "web", 4)
        .with_health_check("web")
        .with_delay(5)
        .depends_on("backend", DependencyKind::Soft);

    let mut model_server = ServiceDescriptor::new(
        "model-server",
        "models/ollama/docker-compose.yml",
        "models",
        5,
    )
    .with_health_check("model-server")
    .with_delay(15);
    model_server.enabled = false;

    LaunchPlan::new(vec![observability, backend, gateway, web, model_server])
}
