//! Engine configuration using Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `KANBAN_` (e.g. `KANBAN_LATENCY_MS`)

use crate::error::{KanbanError, Result};
use crate::store::{FileStore, Seed};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "KANBAN_";

/// Runtime settings for the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the state document is persisted
    pub state_path: PathBuf,
    /// Simulated round-trip delay before a dispatched mutation commits
    pub latency_ms: u64,
    /// Name of the board created when nothing was persisted
    pub seed_board_name: String,
    /// Whether the seed board starts with one column per workflow state
    pub seed_default_columns: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let seed = Seed::default();
        Self {
            state_path: PathBuf::from("kanban-state.json"),
            latency_ms: 250,
            seed_board_name: seed.board_name,
            seed_default_columns: seed.default_columns,
        }
    }
}

impl EngineConfig {
    /// Build the figment for defaults, an optional file and the environment
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

        if let Some(path) = file {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(KanbanError::validation(
                        "config",
                        format!("unsupported config file format: {}", path.display()),
                    ))
                }
            };
            debug!(path = %path.display(), "merged config file");
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load configuration from every source
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract()?;
        debug!(?config, "loaded engine configuration");
        Ok(config)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn seed(&self) -> Seed {
        Seed {
            board_name: self.seed_board_name.clone(),
            default_columns: self.seed_default_columns,
        }
    }

    /// A file store at `state_path`
    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.state_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const VARS: [&str; 4] = [
        "KANBAN_STATE_PATH",
        "KANBAN_LATENCY_MS",
        "KANBAN_SEED_BOARD_NAME",
        "KANBAN_SEED_DEFAULT_COLUMNS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = EngineConfig::load(None).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.state_path, PathBuf::from("kanban-state.json"));
        assert_eq!(config.latency(), Duration::from_millis(250));
        assert_eq!(config.seed().board_name, "My Board");
        assert!(config.seed_default_columns);
    }

    #[test]
    #[serial]
    fn test_toml_file_overrides_defaults() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kanban.toml");
        std::fs::write(&path, "latency_ms = 10\nseed_board_name = \"Sprint\"\n").unwrap();

        let config = EngineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.latency_ms, 10);
        assert_eq!(config.seed_board_name, "Sprint");
        assert_eq!(config.state_path, PathBuf::from("kanban-state.json"));
    }

    #[test]
    #[serial]
    fn test_yaml_and_json_files() {
        clear_env();
        let temp = TempDir::new().unwrap();

        let yaml = temp.path().join("kanban.yaml");
        std::fs::write(&yaml, "seed_default_columns: false\n").unwrap();
        assert!(!EngineConfig::load(Some(&yaml)).unwrap().seed_default_columns);

        let json = temp.path().join("kanban.json");
        std::fs::write(&json, r#"{"state_path": "/tmp/boards.json"}"#).unwrap();
        assert_eq!(
            EngineConfig::load(Some(&json)).unwrap().state_path,
            PathBuf::from("/tmp/boards.json")
        );
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let config = EngineConfig::load(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kanban.toml");
        std::fs::write(&path, "latency_ms = 10\n").unwrap();

        std::env::set_var("KANBAN_LATENCY_MS", "0");
        std::env::set_var("KANBAN_SEED_BOARD_NAME", "From Env");
        let config = EngineConfig::load(Some(&path));
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.latency_ms, 0);
        assert_eq!(config.seed_board_name, "From Env");
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        clear_env();
        std::env::set_var("KANBAN_LATENCY_MS", "soon");
        let result = EngineConfig::load(None);
        clear_env();
        assert!(matches!(result.unwrap_err(), KanbanError::Config(_)));

        let err = EngineConfig::load(Some(Path::new("kanban.ini"))).unwrap_err();
        assert!(err.is_validation());
    }
}
