use std::time::Duration;

use crate::error::{OrchestratorError, Result};
use crate::models::ReadinessProbe;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll an HTTP healthcheck until it answers 200 with `{"status": "ok"}`.
///
/// Unlike the health gate this confirms the application is serving, not
/// just that its container started.
pub async fn wait_until_ready(probe: &ReadinessProbe) -> Result<u32> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    tracing::info!(
        url = %probe.url,
        attempts = probe.attempts,
        interval_secs = probe.interval_secs,
        "waiting for readiness"
    );

    for attempt in 1..=probe.attempts {
        match check_once(&client, &probe.url).await {
            Ok(()) => {
                tracing::info!(url = %probe.url, attempt, "readiness check passed");
                return Ok(attempt);
            }
            Err(e) => {
                tracing::warn!(url = %probe.url, attempt, max = probe.attempts, error = %e, "readiness check failed");
            }
        }
        // No sleep after the final attempt.
        if attempt < probe.attempts {
            tokio::time::sleep(probe.interval()).await;
        }
    }

    Err(OrchestratorError::Readiness(format!(
        "{} not ready after {} attempts",
        probe.url, probe.attempts
    )))
}

async fn check_once(client: &reqwest::Client, url: &str) -> Result<()> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(OrchestratorError::Readiness(format!("status {status}")));
    }
    let body: serde_json::Value = response.json().await?;
    match body.get("status").and_then(|s| s.as_str()) {
        Some("ok") => Ok(()),
        _ => Err(OrchestratorError::Readiness(format!(
            "unexpected body: {body}"
        ))),
    }
}
