use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Failure of the dependency blocks the dependent service.
    Hard,
    /// Failure of the dependency is logged and the dependent still starts.
    #[default]
    Soft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    pub service: String,
    #[serde(default)]
    pub kind: DependencyKind,
}

/// HTTP readiness check run after the container-level health checks pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub url: String,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_attempts() -> u32 {
    10
}

fn default_interval_secs() -> u64 {
    30
}

impl ReadinessProbe {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Reads a one-shot container's logs after the first health check passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogProbe {
    pub container: String,
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

fn default_settle_secs() -> u64 {
    5
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub manifest: PathBuf,
    pub namespace: String,
    pub stage: u32,
    #[serde(default)]
    pub startup_delay_secs: u64,
    /// Containers gated in order; empty means the service is not gated.
    #[serde(default)]
    pub health_checks: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<Dependency>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessProbe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_probe: Option<LogProbe>,
    #[serde(default)]
    pub publishes_agent_routes: bool,
}

impl ServiceDescriptor {
    pub fn new(
        name: impl Into<String>,
        manifest: impl Into<PathBuf>,
        namespace: impl Into<String>,
        stage: u32,
    ) -> Self {
        Self {
            name: name.into(),
            manifest: manifest.into(),
            namespace: namespace.into(),
            stage,
            startup_delay_secs: 0,
            health_checks: Vec::new(),
            depends_on: Vec::new(),
            enabled: true,
            readiness: None,
            log_probe: None,
            publishes_agent_routes: false,
        }
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    pub fn with_health_check(mut self, container: impl Into<String>) -> Self {
        self.health_checks.push(container.into());
        self
    }

    pub fn with_delay(mut self, secs: u64) -> Self {
        self.startup_delay_secs = secs;
        self
    }

    pub fn depends_on(mut self, service: impl Into<String>, kind: DependencyKind) -> Self {
        self.depends_on.push(Dependency {
            service: service.into(),
            kind,
        });
        self
    }
}

/// An ordered, validated set of services. Construction fails on duplicate
/// names, unknown or forward-stage dependencies, and cycles.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Deserialize)]
struct PlanFile {
    services: Vec<ServiceDescriptor>,
}

impl LaunchPlan {
    pub fn new(services: Vec<ServiceDescriptor>) -> Result<Self> {
        let ordered = order_services(services)?;
        Ok(Self { services: ordered })
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: PlanFile = serde_yaml::from_str(contents)
            .map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;
        Self::new(file.services)
    }

    /// Services in execution order.
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Distinct stage ordinals in ascending order.
    pub fn stages(&self) -> Vec<u32> {
        self.services
            .iter()
            .map(|s| s.stage)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Topological sort keyed by (stage, declaration index) so that independent
/// services keep their declared order.
fn order_services(services: Vec<ServiceDescriptor>) -> Result<Vec<ServiceDescriptor>> {
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();
    for (i, service) in services.iter().enumerate() {
        if service.name.is_empty() {
            return Err(OrchestratorError::InvalidPlan(format!(
                "service #{i} has an empty name"
            )));
        }
        if index_by_name.insert(service.name.as_str(), i).is_some() {
            return Err(OrchestratorError::InvalidPlan(format!(
                "duplicate service '{}'",
                service.name
            )));
        }
    }

    let mut in_degree = vec![0usize; services.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); services.len()];
    for (i, service) in services.iter().enumerate() {
        for dep in &service.depends_on {
            let &j = index_by_name.get(dep.service.as_str()).ok_or_else(|| {
                OrchestratorError::InvalidPlan(format!(
                    "'{}' depends on unknown service '{}'",
                    service.name, dep.service
                ))
            })?;
            if services[j].stage > service.stage {
                return Err(OrchestratorError::InvalidPlan(format!(
                    "'{}' (stage {}) depends on '{}' from later stage {}",
                    service.name, service.stage, dep.service, services[j].stage
                )));
            }
            in_degree[i] += 1;
            dependents[j].push(i);
        }
    }

    let mut ready: BTreeSet<(u32, usize)> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| (services[i].stage, i))
        .collect();
    let mut order = Vec::with_capacity(services.len());
    while let Some(next) = ready.pop_first() {
        let (_, i) = next;
        order.push(i);
        for &k in &dependents[i] {
            in_degree[k] -= 1;
            if in_degree[k] == 0 {
                ready.insert((services[k].stage, k));
            }
        }
    }

    if order.len() != services.len() {
        let stuck: Vec<&str> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d > 0)
            .map(|(i, _)| services[i].name.as_str())
            .collect();
        return Err(OrchestratorError::InvalidPlan(format!(
            "dependency cycle between: {}",
            stuck.join(", ")
        )));
    }

    let mut slots: Vec<Option<ServiceDescriptor>> = services.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}
