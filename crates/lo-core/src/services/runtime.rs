use std::path::Path;

use async_trait::async_trait;

use crate::error::{OrchestratorError, Result};
use crate::models::ContainerState;

use super::command::{CommandRunner, Invocation};

/// The container runtime operations the launcher depends on.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn network_exists(&self, name: &str) -> Result<bool>;

    /// Create a network. Callers check existence first; implementations may
    /// still report "already exists" if another process raced them.
    async fn create_network(&self, name: &str) -> Result<()>;

    /// Bring up every container in `manifest` under project `namespace`.
    async fn compose_up(
        &self,
        manifest: &Path,
        namespace: &str,
        env: &[(String, String)],
    ) -> Result<()>;

    async fn container_state(&self, container: &str) -> Result<ContainerState>;

    async fn container_logs(&self, container: &str) -> Result<String>;
}

/// `ContainerRuntime` backed by the docker CLI.
pub struct DockerCli<R> {
    runner: R,
    binary: String,
}

impl<R: CommandRunner> DockerCli<R> {
    pub fn new(runner: R, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![self.binary.clone()];
        argv.extend(args.into_iter().map(Into::into));
        Invocation { argv, env: Vec::new() }
    }
}

#[async_trait]
impl<R: CommandRunner> ContainerRuntime for DockerCli<R> {
    async fn network_exists(&self, name: &str) -> Result<bool> {
        let filter = format!("name={name}");
        let invocation = self.invocation([
            "network", "ls", "--filter", filter.as_str(), "--format", "{{.Name}}",
        ]);
        let output = self.runner.run(&invocation, true).await?;
        // The name filter matches substrings, so compare whole lines.
        Ok(output.stdout.lines().any(|line| line.trim() == name))
    }

    async fn create_network(&self, name: &str) -> Result<()> {
        let invocation = self.invocation(["network", "create", name]);
        self.runner.run(&invocation, true).await?;
        Ok(())
    }

    async fn compose_up(
        &self,
        manifest: &Path,
        namespace: &str,
        env: &[(String, String)],
    ) -> Result<()> {
        if !manifest.exists() {
            return Err(OrchestratorError::Process(format!(
                "manifest not found: {}",
                manifest.display()
            )));
        }
        let manifest = manifest.to_string_lossy();
        let invocation = self
            .invocation(["compose", "-f", &*manifest, "-p", namespace, "up", "-d"])
            .envs(env);
        self.runner.run(&invocation, true).await?;
        Ok(())
    }

    async fn container_state(&self, container: &str) -> Result<ContainerState> {
        let invocation = self.invocation(["inspect", "-f", "{{.State.Status}}", container]);
        let output = self.runner.run(&invocation, false).await?;
        if !output.success {
            return Ok(ContainerState::NotFound);
        }
        Ok(ContainerState::from_status(&output.stdout))
    }

    async fn container_logs(&self, container: &str) -> Result<String> {
        let invocation = self.invocation(["logs", container]);
        let output = self.runner.run(&invocation, true).await?;
        // docker logs replays the container's stderr on stderr.
        Ok(match (output.stdout.is_empty(), output.stderr.is_empty()) {
            (_, true) => output.stdout,
            (true, false) => output.stderr,
            (false, false) => format!("{}\n{}", output.stdout, output.stderr),
        })
    }
}
