use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_CORE_NETWORKS: [&str; 2] = ["agents-net", "app-network"];

/// Immutable launch configuration, built once at startup and passed by
/// reference to every component.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    pub root: PathBuf,
    pub agents_dir: PathBuf,
    pub network: String,
    pub backend_api_url: String,
    pub gateway_url: String,
    pub gateway_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_public_host: Option<String>,
    pub tracing_enabled: bool,
    pub agent_registry_url: String,
    pub agent_image_tag: String,
    pub health_timeout_secs: u64,
    pub abort_on_network_failure: bool,
    pub docker_bin: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            agents_dir: PathBuf::from("agents"),
            network: "launch-network".into(),
            backend_api_url: "http://localhost:8000".into(),
            gateway_url: "http://localhost:9100".into(),
            gateway_port: 9100,
            gateway_public_host: None,
            tracing_enabled: false,
            agent_registry_url: "docker.io".into(),
            agent_image_tag: "latest".into(),
            health_timeout_secs: 60,
            abort_on_network_failure: false,
            docker_bin: "docker".into(),
        }
    }
}

impl LaunchConfig {
    /// Build from the process environment. Missing variables take defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests never touch the real
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            root: get("LAUNCH_ROOT").map(PathBuf::from).unwrap_or(defaults.root),
            agents_dir: get("AGENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.agents_dir),
            network: get("LAUNCH_NETWORK").unwrap_or(defaults.network),
            backend_api_url: get("BACKEND_API_URL").unwrap_or(defaults.backend_api_url),
            gateway_url: get("GATEWAY_URL").unwrap_or(defaults.gateway_url),
            gateway_port: parse_or("GATEWAY_PORT", get("GATEWAY_PORT"), defaults.gateway_port),
            gateway_public_host: get("GATEWAY_PUBLIC_HOST"),
            tracing_enabled: get("TRACING_ENABLED")
                .map(|v| parse_flag("TRACING_ENABLED", &v, defaults.tracing_enabled))
                .unwrap_or(defaults.tracing_enabled),
            agent_registry_url: get("AGENT_REGISTRY_URL").unwrap_or(defaults.agent_registry_url),
            agent_image_tag: get("AGENT_IMAGE_TAG").unwrap_or(defaults.agent_image_tag),
            health_timeout_secs: parse_or(
                "HEALTH_TIMEOUT_SECS",
                get("HEALTH_TIMEOUT_SECS"),
                defaults.health_timeout_secs,
            ),
            abort_on_network_failure: get("ABORT_ON_NETWORK_FAILURE")
                .map(|v| {
                    parse_flag(
                        "ABORT_ON_NETWORK_FAILURE",
                        &v,
                        defaults.abort_on_network_failure,
                    )
                })
                .unwrap_or(defaults.abort_on_network_failure),
            docker_bin: get("DOCKER_BIN").unwrap_or(defaults.docker_bin),
        }
    }

    /// Return a copy rooted at `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Resolve a plan-relative path against the launch root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn agents_root(&self) -> PathBuf {
        self.resolve(&self.agents_dir)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Platform networks that are reconciled on every run, regardless of
    /// which agents are installed.
    pub fn core_networks(&self) -> Vec<String> {
        let mut networks: Vec<String> = DEFAULT_CORE_NETWORKS.iter().map(|n| n.to_string()).collect();
        if !networks.contains(&self.network) {
            networks.push(self.network.clone());
        }
        networks
    }

    /// Variables exported to manifest commands for interpolation.
    pub fn manifest_env(&self) -> Vec<(String, String)> {
        vec![
            ("LAUNCH_NETWORK".into(), self.network.clone()),
            ("BACKEND_API_URL".into(), self.backend_api_url.clone()),
            ("GATEWAY_URL".into(), self.gateway_url.clone()),
            ("TRACING_ENABLED".into(), self.tracing_enabled.to_string()),
            ("AGENT_REGISTRY_URL".into(), self.agent_registry_url.clone()),
            ("AGENT_IMAGE_TAG".into(), self.agent_image_tag.clone()),
        ]
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "unparseable value, using default");
            default
        }),
    }
}

fn parse_flag(key: &str, raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        other => {
            tracing::warn!(key, value = other, "unrecognised flag, using default");
            default
        }
    }
}
