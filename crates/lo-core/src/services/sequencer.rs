use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::{
    AgentEndpoint, DependencyKind, HealthOutcome, LaunchConfig, LaunchPlan, ServiceDescriptor,
    ServiceOutcome, ServiceRunStatus,
};

use super::endpoint_resolver::EndpointResolver;
use super::health_gate::HealthGate;
use super::migrations::{self, MigrationStatus};
use super::readiness;
use super::runtime::ContainerRuntime;

#[derive(Debug, Default)]
pub struct SequenceResult {
    pub outcomes: Vec<ServiceOutcome>,
    pub endpoints: Vec<AgentEndpoint>,
}

/// Brings services up one at a time in plan order.
///
/// A service whose hard dependency failed is skipped; a failed soft
/// dependency only produces a warning. Nothing is rolled back, so a re-run
/// converges on whatever the previous run left in place.
pub struct StageSequencer<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
    config: &'a LaunchConfig,
    gate: HealthGate,
    routes: Option<(&'a EndpointResolver, &'a [String])>,
}

impl<'a, R: ContainerRuntime + ?Sized> StageSequencer<'a, R> {
    pub fn new(runtime: &'a R, config: &'a LaunchConfig) -> Self {
        Self {
            runtime,
            config,
            gate: HealthGate::with_timeout(config.health_timeout()),
            routes: None,
        }
    }

    pub fn with_gate(mut self, gate: HealthGate) -> Self {
        self.gate = gate;
        self
    }

    /// Resolve `agents` through `resolver` once a route-publishing service
    /// is healthy.
    pub fn with_agent_routes(mut self, resolver: &'a EndpointResolver, agents: &'a [String]) -> Self {
        self.routes = Some((resolver, agents));
        self
    }

    pub async fn run(&self, plan: &LaunchPlan) -> SequenceResult {
        let mut result = SequenceResult::default();
        let mut healthy: HashMap<&str, bool> = HashMap::new();
        let mut current_stage = None;

        for service in plan.services() {
            if current_stage != Some(service.stage) {
                current_stage = Some(service.stage);
                tracing::info!(stage = service.stage, "entering stage");
            }

            let outcome = self.run_service(service, &healthy).await;
            let is_healthy = outcome.is_healthy();
            healthy.insert(service.name.as_str(), is_healthy);

            if is_healthy && service.publishes_agent_routes {
                if let Some((resolver, agents)) = self.routes {
                    result
                        .endpoints
                        .extend(resolver.resolve_all(agents.iter().map(String::as_str)));
                }
            }
            result.outcomes.push(outcome);
        }
        result
    }

    async fn run_service(
        &self,
        service: &ServiceDescriptor,
        healthy: &HashMap<&str, bool>,
    ) -> ServiceOutcome {
        let start = Instant::now();
        let mut outcome = ServiceOutcome {
            service: service.name.clone(),
            stage: service.stage,
            status: ServiceRunStatus::Healthy,
            health: Vec::new(),
            elapsed: Duration::ZERO,
        };

        if !service.enabled {
            tracing::info!(service = %service.name, "service disabled, not starting");
            outcome.status = ServiceRunStatus::Disabled;
            return outcome;
        }

        let mut blocked_by = Vec::new();
        for dep in &service.depends_on {
            if healthy.get(dep.service.as_str()).copied().unwrap_or(false) {
                continue;
            }
            match dep.kind {
                DependencyKind::Hard => blocked_by.push(dep.service.clone()),
                DependencyKind::Soft => tracing::warn!(
                    service = %service.name,
                    dependency = %dep.service,
                    "soft dependency is not healthy, starting anyway"
                ),
            }
        }
        if !blocked_by.is_empty() {
            tracing::error!(service = %service.name, blocked_by = ?blocked_by, "hard dependency failed, skipping");
            outcome.status = ServiceRunStatus::Skipped { blocked_by };
            return outcome;
        }

        outcome.status = self.start_and_gate(service, &mut outcome.health).await;
        if let ServiceRunStatus::StartFailed { .. } = outcome.status {
            outcome.elapsed = start.elapsed();
            return outcome;
        }

        if outcome.is_healthy() {
            tracing::info!(service = %service.name, "service started successfully");
        } else {
            tracing::error!(service = %service.name, status = ?outcome.status, "service failed to start, continuing");
        }

        // Applied whenever the start command went out, healthy or not.
        let delay = service.startup_delay();
        if !delay.is_zero() {
            tracing::info!(service = %service.name, delay_secs = delay.as_secs(), "waiting before next service");
            tokio::time::sleep(delay).await;
        }

        outcome.elapsed = start.elapsed();
        outcome
    }

    async fn start_and_gate(
        &self,
        service: &ServiceDescriptor,
        health: &mut Vec<HealthOutcome>,
    ) -> ServiceRunStatus {
        tracing::info!(service = %service.name, stage = service.stage, "starting service");
        let manifest = self.config.resolve(&service.manifest);
        if let Err(e) = self
            .runtime
            .compose_up(&manifest, &service.namespace, &self.config.manifest_env())
            .await
        {
            tracing::error!(service = %service.name, error = %e, "start command failed");
            return ServiceRunStatus::StartFailed {
                error: e.to_string(),
            };
        }

        for (i, container) in service.health_checks.iter().enumerate() {
            let result = self.gate.wait_for_running(self.runtime, container).await;
            let ok = result.is_healthy();
            health.push(result.clone());
            if !ok {
                return ServiceRunStatus::Unhealthy { outcome: result };
            }
            if i == 0 {
                self.run_log_probe(service).await;
            }
        }

        if let Some(probe) = &service.readiness {
            if let Err(e) = readiness::wait_until_ready(probe).await {
                return ServiceRunStatus::NotReady {
                    error: e.to_string(),
                };
            }
        }
        ServiceRunStatus::Healthy
    }

    /// Informational only: an unclear or unreadable log never fails the
    /// service.
    async fn run_log_probe(&self, service: &ServiceDescriptor) {
        let Some(probe) = &service.log_probe else {
            return;
        };
        if probe.settle_secs > 0 {
            tokio::time::sleep(Duration::from_secs(probe.settle_secs)).await;
        }
        match self.runtime.container_logs(&probe.container).await {
            Ok(logs) => match migrations::classify(&logs) {
                MigrationStatus::AlreadyBootstrapped => {
                    tracing::info!(container = %probe.container, "database already bootstrapped")
                }
                MigrationStatus::Completed { processed } => {
                    tracing::info!(container = %probe.container, processed, "migrations completed")
                }
                MigrationStatus::Unclear => {
                    tracing::warn!(container = %probe.container, logs = %logs, "migration status unclear from logs")
                }
            },
            Err(e) => {
                tracing::warn!(container = %probe.container, error = %e, "could not read migration logs")
            }
        }
    }
}
