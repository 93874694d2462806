use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{OrchestratorError, Result};
use crate::models::NetworkRequirement;

/// Manifest file names looked up in each agent directory, in priority order.
pub const MANIFEST_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedManifest {
    pub agent: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one discovery pass over the agents directory.
#[derive(Debug, Clone, Default)]
pub struct TopologyScan {
    /// Agent directory names that contain a manifest, sorted.
    pub agents: Vec<String>,
    pub requirements: BTreeSet<NetworkRequirement>,
    pub skipped: Vec<SkippedManifest>,
}

impl TopologyScan {
    pub fn external_network_names(&self) -> BTreeSet<String> {
        self.requirements
            .iter()
            .filter(|r| r.external)
            .map(|r| r.name.clone())
            .collect()
    }
}

/// Scan every agent subdirectory under `agents_root` and collect the
/// networks their manifests mark as external.
///
/// Best effort: a missing root yields an empty scan, and a manifest that
/// cannot be read or parsed is logged and skipped.
pub async fn scan(agents_root: &Path) -> TopologyScan {
    let mut result = TopologyScan::default();

    let agent_dirs = match list_agent_dirs(agents_root).await {
        Ok(dirs) => dirs,
        Err(e) => {
            tracing::warn!(path = %agents_root.display(), error = %e, "agents directory not readable");
            return result;
        }
    };

    for (agent, dir) in agent_dirs {
        let Some(manifest) = find_manifest(&dir) else {
            continue;
        };
        result.agents.push(agent.clone());

        match read_external_networks(&manifest).await {
            Ok(networks) => {
                tracing::debug!(agent = %agent, count = networks.len(), "scanned agent manifest");
                result
                    .requirements
                    .extend(networks.into_iter().map(NetworkRequirement::external));
            }
            Err(e) => {
                tracing::error!(agent = %agent, path = %manifest.display(), error = %e, "skipping unreadable agent manifest");
                result.skipped.push(SkippedManifest {
                    agent,
                    path: manifest,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        agents = result.agents.len(),
        networks = result.requirements.len(),
        skipped = result.skipped.len(),
        "scanned agent network topology"
    );
    result
}

/// Convenience wrapper returning only the unique external network names.
pub async fn external_networks(agents_root: &Path) -> BTreeSet<String> {
    scan(agents_root).await.external_network_names()
}

async fn list_agent_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    if !root.exists() {
        tracing::warn!(path = %root.display(), "agents directory not found");
        return Ok(dirs);
    }

    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            dirs.push((name.to_string(), path.clone()));
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn find_manifest(dir: &Path) -> Option<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

async fn read_external_networks(manifest: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(manifest).await?;
    external_networks_in(&contents)
}

/// Extract external network names from manifest text.
pub fn external_networks_in(contents: &str) -> Result<Vec<String>> {
    let document: Value = serde_yaml::from_str(contents)?;
    let root = match &document {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(map) => map,
        _ => {
            return Err(OrchestratorError::InvalidConfig(
                "manifest is not a mapping".into(),
            ))
        }
    };

    let networks = match root.get("networks") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(networks)) => networks,
        Some(_) => {
            return Err(OrchestratorError::InvalidConfig(
                "`networks` is not a mapping".into(),
            ))
        }
    };

    let mut names = Vec::new();
    for (key, config) in networks {
        let Some(key) = key.as_str() else {
            continue;
        };
        let Value::Mapping(config) = config else {
            continue;
        };
        match config.get("external") {
            Some(Value::Bool(true)) => {
                let name = config.get("name").and_then(Value::as_str).unwrap_or(key);
                names.push(name.to_string());
            }
            // Legacy form: `external: { name: actual-name }`.
            Some(Value::Mapping(external)) => {
                let name = external
                    .get("name")
                    .and_then(Value::as_str)
                    .or_else(|| config.get("name").and_then(Value::as_str))
                    .unwrap_or(key);
                names.push(name.to_string());
            }
            _ => {}
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_agent(root: &Path, agent: &str, manifest: &str) {
        let dir = root.join(agent);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("docker-compose.yml"), manifest).unwrap();
    }

    #[test]
    fn only_external_entries_count() {
        let yaml = r#"
services:
  agent:
    image: agent:latest
networks:
  shared-net:
    external: true
  private:
    driver: bridge
  flagged-false:
    external: false
  stringly:
    external: "true"
"#;
        assert_eq!(external_networks_in(yaml).unwrap(), vec!["shared-net"]);
    }

    #[test]
    fn legacy_external_name_is_used() {
        let yaml = r#"
networks:
  alias:
    external:
      name: real-net
"#;
        assert_eq!(external_networks_in(yaml).unwrap(), vec!["real-net"]);
    }

    #[test]
    fn top_level_name_overrides_key() {
        let yaml = r#"
networks:
  shared:
    external: true
    name: platform-shared-net
  agents-net:
    external: true
"#;
        assert_eq!(
            external_networks_in(yaml).unwrap(),
            vec!["platform-shared-net", "agents-net"]
        );
    }

    #[test]
    fn empty_or_missing_networks_yield_nothing() {
        assert!(external_networks_in("").unwrap().is_empty());
        assert!(external_networks_in("services: {}\n").unwrap().is_empty());
        assert!(external_networks_in("networks:\n").unwrap().is_empty());
    }

    #[test]
    fn non_mapping_manifest_is_an_error() {
        assert!(external_networks_in("- just\n- a list\n").is_err());
        assert!(external_networks_in("networks: [a, b]\n").is_err());
    }

    #[tokio::test]
    async fn missing_root_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let scan = scan(&dir.path().join("agents")).await;
        assert!(scan.agents.is_empty());
        assert!(scan.requirements.is_empty());
    }

    #[tokio::test]
    async fn shared_network_and_no_networks_section() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(
            dir.path(),
            "translator",
            "networks:\n  shared-net:\n    external: true\n",
        );
        write_agent(dir.path(), "summarizer", "services:\n  app:\n    image: s:1\n");

        let scan = scan(dir.path()).await;
        assert_eq!(scan.agents, vec!["summarizer", "translator"]);
        assert_eq!(
            scan.external_network_names().into_iter().collect::<Vec<_>>(),
            vec!["shared-net"]
        );
    }

    #[tokio::test]
    async fn duplicates_collapse_across_agents() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_agent(
                dir.path(),
                &format!("agent-{i}"),
                "networks:\n  agents-net:\n    external: true\n  extra:\n    external: true\n",
            );
        }
        write_agent(
            dir.path(),
            "agent-x",
            "networks:\n  agents-net:\n    external: true\n  only-x:\n    external: true\n",
        );

        let names = external_networks(dir.path()).await;
        assert_eq!(names.len(), 3);
        assert!(names.contains("agents-net"));
        assert!(names.contains("extra"));
        assert!(names.contains("only-x"));
    }

    #[tokio::test]
    async fn malformed_manifest_does_not_abort_scan() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(dir.path(), "broken", "networks: {unterminated\n");
        write_agent(dir.path(), "healthy", "networks:\n  shared-net:\n    external: true\n");
        fs::create_dir_all(dir.path().join("no-manifest")).unwrap();
        fs::write(dir.path().join("stray-file.txt"), "ignored").unwrap();

        let scan = scan(dir.path()).await;
        assert_eq!(scan.agents, vec!["broken", "healthy"]);
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].agent, "broken");
        assert_eq!(
            scan.external_network_names().into_iter().collect::<Vec<_>>(),
            vec!["shared-net"]
        );
    }

    #[tokio::test]
    async fn alternate_manifest_names_are_found() {
        let dir = tempfile::tempdir().unwrap();
        let agent = dir.path().join("planner");
        fs::create_dir_all(&agent).unwrap();
        fs::write(
            agent.join("compose.yaml"),
            "networks:\n  planner-net:\n    external: true\n",
        )
        .unwrap();

        let names = external_networks(dir.path()).await;
        assert!(names.contains("planner-net"));
    }
}
