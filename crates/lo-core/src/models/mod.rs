pub mod config;
pub mod endpoint;
pub mod health;
pub mod network;
pub mod plan;
pub mod report;

pub use config::LaunchConfig;
pub use endpoint::{AddressSource, AgentEndpoint};
pub use health::{ContainerState, HealthOutcome, HealthState};
pub use network::{
    NetworkRequirement, ReconciliationReport, ReconciliationResult, ReconciliationStatus,
};
pub use plan::{Dependency, DependencyKind, LaunchPlan, LogProbe, ReadinessProbe, ServiceDescriptor};
pub use report::{LaunchReport, ServiceOutcome, ServiceRunStatus};
