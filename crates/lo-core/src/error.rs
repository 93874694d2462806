use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("command `{command}` failed (exit {exit}): {stderr}", exit = .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    CommandExecution {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("process failed: {0}")]
    Process(String),

    #[error("config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid launch plan: {0}")]
    InvalidPlan(String),

    #[error("readiness probe failed: {0}")]
    Readiness(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
