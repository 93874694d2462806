use chrono::Utc;

use crate::models::{LaunchConfig, LaunchPlan, LaunchReport};

use super::endpoint_resolver::EndpointResolver;
use super::health_gate::HealthGate;
use super::network_reconciler;
use super::network_scanner::{self, TopologyScan};
use super::runtime::ContainerRuntime;
use super::sequencer::StageSequencer;

/// Top-level run: networks first, then services, then agent endpoints.
pub struct Launcher<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
    config: &'a LaunchConfig,
    resolver: Option<EndpointResolver>,
    gate: HealthGate,
}

impl<'a, R: ContainerRuntime + ?Sized> Launcher<'a, R> {
    pub fn new(runtime: &'a R, config: &'a LaunchConfig) -> Self {
        Self {
            runtime,
            config,
            resolver: None,
            gate: HealthGate::with_timeout(config.health_timeout()),
        }
    }

    pub fn with_resolver(mut self, resolver: EndpointResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_gate(mut self, gate: HealthGate) -> Self {
        self.gate = gate;
        self
    }

    /// Scan agent manifests and reconcile core and agent networks.
    pub async fn setup_networks(&self, report: &mut LaunchReport) -> TopologyScan {
        tracing::info!("setting up networks");
        let scan = network_scanner::scan(&self.config.agents_root()).await;
        report
            .networks
            .push(network_reconciler::ensure_core_networks(self.runtime, self.config).await);
        report
            .networks
            .push(network_reconciler::ensure_agent_networks(self.runtime, &scan).await);
        scan
    }

    pub async fn run(&self, plan: &LaunchPlan) -> LaunchReport {
        tracing::info!(services = plan.services().len(), "starting launch");
        let mut report = LaunchReport::new();

        let scan = self.setup_networks(&mut report).await;
        if !report.networks_complete() {
            if self.config.abort_on_network_failure {
                tracing::error!("network setup failed, not starting services");
                report.aborted = true;
                report.finished_at = Some(Utc::now());
                return report;
            }
            tracing::error!("network setup incomplete, continuing with services");
        }

        // Host discovery only happens when some service publishes routes.
        let publishes = plan
            .services()
            .iter()
            .any(|s| s.enabled && s.publishes_agent_routes);
        let discovered;
        let mut sequencer = StageSequencer::new(self.runtime, self.config).with_gate(self.gate);
        if publishes {
            let resolver = match &self.resolver {
                Some(resolver) => resolver,
                None => {
                    discovered = EndpointResolver::discover(self.config);
                    &discovered
                }
            };
            sequencer = sequencer.with_agent_routes(resolver, &scan.agents);
        }
        let sequence = sequencer.run(plan).await;
        report.services = sequence.outcomes;
        report.agent_endpoints = sequence.endpoints;
        report.finished_at = Some(Utc::now());

        let started = report.started_services();
        let failed = report.failed_services();
        if report.is_success() {
            tracing::info!(started = ?started, "all services started successfully");
        } else {
            tracing::error!(started = ?started, failed = ?failed, "some services failed to start");
        }
        report
    }

    /// The injected resolver, if any. Without one, `run` discovers the host
    /// address itself.
    pub fn resolver(&self) -> Option<&EndpointResolver> {
        self.resolver.as_ref()
    }
}
