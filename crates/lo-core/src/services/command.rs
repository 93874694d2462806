use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{OrchestratorError, Result};

/// A single external lifecycle command: argument vector plus any extra
/// environment the child should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }

    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.env.extend(vars.iter().cloned());
        self
    }

    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Convert a failed output into the error strict callers receive.
    pub fn into_error(self, invocation: &Invocation) -> OrchestratorError {
        OrchestratorError::CommandExecution {
            command: invocation.display(),
            code: self.code,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Executes lifecycle commands. Never retries; callers decide whether a
/// failure matters by choosing `strict`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation, strict: bool) -> Result<CommandOutput>;
}

/// Runs commands as child processes, capturing stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation, strict: bool) -> Result<CommandOutput> {
        let (program, args) = invocation
            .argv
            .split_first()
            .ok_or_else(|| OrchestratorError::Process("empty command".into()))?;

        tracing::info!(command = %invocation.display(), "running");
        let output = Command::new(program)
            .args(args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .await
            .map_err(|e| OrchestratorError::Process(format!("failed to run {program}: {e}")))?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };

        if !result.success {
            tracing::debug!(
                command = %invocation.display(),
                code = ?result.code,
                stderr = %result.stderr,
                "command exited unsuccessfully"
            );
            if strict {
                return Err(result.into_error(invocation));
            }
        }
        Ok(result)
    }
}
