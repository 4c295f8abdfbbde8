//! Configuration loader and validator for the football-data sync task.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub upstream: Upstream,
    pub store: Store,
    pub sync: Sync,
}

/// Upstream sports API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Upstream {
    pub base_url: String,
    pub auth_token: String,
}

/// Document store connection settings and collection mappings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub collections: Collections,
}

/// Target collections, one per record kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collections {
    pub competitions: String,
    pub standings: String,
    pub matches: String,
}

/// Sync loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sync {
    /// Maximum upstream calls permitted in a single invocation.
    #[serde(default = "default_request_budget")]
    pub request_budget: u32,
}

fn default_request_budget() -> u32 {
    10
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.upstream.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("upstream.base_url must be non-empty"));
    }
    if cfg.upstream.auth_token.trim().is_empty() {
        return Err(ConfigError::Invalid("upstream.auth_token must be non-empty"));
    }

    if cfg.store.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid("store.endpoint must be non-empty"));
    }
    if cfg.store.project_id.trim().is_empty() {
        return Err(ConfigError::Invalid("store.project_id must be non-empty"));
    }
    if cfg.store.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("store.api_key must be non-empty"));
    }
    if cfg.store.database_id.trim().is_empty() {
        return Err(ConfigError::Invalid("store.database_id must be non-empty"));
    }

    let cols = &cfg.store.collections;
    if cols.competitions.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "store.collections.competitions must be non-empty",
        ));
    }
    if cols.standings.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "store.collections.standings must be non-empty",
        ));
    }
    if cols.matches.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "store.collections.matches must be non-empty",
        ));
    }

    if cfg.sync.request_budget == 0 {
        return Err(ConfigError::Invalid("sync.request_budget must be > 0"));
    }

    Ok(())
}

/// Example YAML matching the shipped `config.yaml`.
pub fn example() -> &'static str {
    r#"upstream:
  base_url: "https://api.football-data.org/v4/"
  auth_token: "YOUR_FOOTBALL_DATA_TOKEN"

store:
  endpoint: "https://cloud.appwrite.io/v1/"
  project_id: "YOUR_PROJECT_ID"
  api_key: "YOUR_API_KEY"
  database_id: "YOUR_DATABASE_ID"
  collections:
    competitions: "COMPETITIONS_COLLECTION_ID"
    standings: "STANDINGS_COLLECTION_ID"
    matches: "MATCHES_COLLECTION_ID"

sync:
  request_budget: 10
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.sync.request_budget, 10);
    }

    #[test]
    fn budget_defaults_when_omitted() {
        let yaml = example().replace("sync:\n  request_budget: 10\n", "sync: {}\n");
        let cfg: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(cfg.sync.request_budget, 10);
    }

    #[test]
    fn invalid_auth_token() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.upstream.auth_token = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("upstream.auth_token")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_store_settings() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.store.database_id = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("database_id")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.store.project_id = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_collection_mappings() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.store.collections.competitions = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("competitions")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.store.collections.standings = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.store.collections.matches = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_budget_rejected() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.sync.request_budget = 0;
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("request_budget")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.store.collections.matches, "MATCHES_COLLECTION_ID");
    }
}
