// Each test binary compiles this module independently and uses a different
// subset of helpers, so unused-function warnings are expected.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use lo_core::models::ContainerState;
use lo_core::services::runtime::ContainerRuntime;
use lo_core::{OrchestratorError, Result};

/// In-memory container runtime. Containers replay a scripted sequence of
/// states; the last state repeats forever.
#[derive(Default)]
pub struct FakeRuntime {
    networks: Mutex<BTreeSet<String>>,
    failing_networks: Mutex<HashSet<String>>,
    racing_networks: Mutex<HashSet<String>>,
    create_calls: Mutex<Vec<String>>,
    containers: Mutex<HashMap<String, VecDeque<ContainerState>>>,
    probe_errors: Mutex<HashSet<String>>,
    failing_namespaces: Mutex<HashSet<String>>,
    compose_calls: Mutex<Vec<(PathBuf, String)>>,
    logs: Mutex<HashMap<String, String>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_networks(names: &[&str]) -> Self {
        let runtime = Self::new();
        runtime
            .networks
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        runtime
    }

    pub fn fail_network(&self, name: &str) {
        self.failing_networks.lock().unwrap().insert(name.into());
    }

    /// Creation reports "already exists" as if another process won the race.
    pub fn race_network(&self, name: &str) {
        self.racing_networks.lock().unwrap().insert(name.into());
    }

    pub fn script(&self, container: &str, states: Vec<ContainerState>) {
        self.containers
            .lock()
            .unwrap()
            .insert(container.into(), states.into());
    }

    pub fn running(&self, container: &str) {
        self.script(container, vec![ContainerState::Running]);
    }

    pub fn probe_error(&self, container: &str) {
        self.probe_errors.lock().unwrap().insert(container.into());
    }

    pub fn fail_compose(&self, namespace: &str) {
        self.failing_namespaces.lock().unwrap().insert(namespace.into());
    }

    pub fn set_logs(&self, container: &str, logs: &str) {
        self.logs.lock().unwrap().insert(container.into(), logs.into());
    }

    pub fn networks(&self) -> BTreeSet<String> {
        self.networks.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<String> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn started_namespaces(&self) -> Vec<String> {
        self.compose_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, ns)| ns.clone())
            .collect()
    }

    pub fn compose_manifests(&self) -> Vec<PathBuf> {
        self.compose_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }
}

fn failure(command: &str, stderr: &str) -> OrchestratorError {
    OrchestratorError::CommandExecution {
        command: command.into(),
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.into(),
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn network_exists(&self, name: &str) -> Result<bool> {
        Ok(self.networks.lock().unwrap().contains(name))
    }

    async fn create_network(&self, name: &str) -> Result<()> {
        self.create_calls.lock().unwrap().push(name.into());
        if self.failing_networks.lock().unwrap().contains(name) {
            return Err(failure("docker network create", "permission denied"));
        }
        let mut networks = self.networks.lock().unwrap();
        if self.racing_networks.lock().unwrap().contains(name) {
            networks.insert(name.into());
            return Err(failure(
                "docker network create",
                &format!("network with name {name} already exists"),
            ));
        }
        if !networks.insert(name.into()) {
            return Err(failure(
                "docker network create",
                &format!("network with name {name} already exists"),
            ));
        }
        Ok(())
    }

    async fn compose_up(
        &self,
        manifest: &Path,
        namespace: &str,
        _env: &[(String, String)],
    ) -> Result<()> {
        self.compose_calls
            .lock()
            .unwrap()
            .push((manifest.to_path_buf(), namespace.into()));
        if self.failing_namespaces.lock().unwrap().contains(namespace) {
            return Err(failure("docker compose up", "pull access denied"));
        }
        Ok(())
    }

    async fn container_state(&self, container: &str) -> Result<ContainerState> {
        if self.probe_errors.lock().unwrap().contains(container) {
            return Err(OrchestratorError::Process("docker daemon unreachable".into()));
        }
        let mut containers = self.containers.lock().unwrap();
        let Some(states) = containers.get_mut(container) else {
            return Ok(ContainerState::NotFound);
        };
        let state = if states.len() > 1 {
            states.pop_front().unwrap()
        } else {
            states.front().cloned().unwrap_or(ContainerState::NotFound)
        };
        Ok(state)
    }

    async fn container_logs(&self, container: &str) -> Result<String> {
        self.logs
            .lock()
            .unwrap()
            .get(container)
            .cloned()
            .ok_or_else(|| failure("docker logs", "No such container"))
    }
}

pub fn write_agent(root: &Path, agent: &str, manifest: &str) {
    let dir = root.join(agent);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("docker-compose.yml"), manifest).unwrap();
}
