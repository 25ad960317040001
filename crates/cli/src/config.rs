//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration file (`~/.config/pfvt/config.json`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Advisor service URL
    pub api_url: Option<String>,
    /// Scenario store file
    pub scenario_store: Option<PathBuf>,
    /// Default output format (`table` or `json`)
    pub default_format: Option<String>,
}

impl Config {
    /// Load the config file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.json")),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("pfvt"))
}

/// Flag value, then config file value, then the service default
pub fn resolve_api_url(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Flag value, then config file value, then `~/.config/pfvt/scenarios.json`
pub fn resolve_store_path(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = flag.or_else(|| config.scenario_store.clone()) {
        return Ok(path);
    }
    let dir = config_dir().context("Could not determine home directory")?;
    Ok(dir.join("scenarios.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_flag_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_url": "http://advisor:9000", "scenario_store": "/tmp/s.json"}"#,
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(resolve_api_url(None, &config), "http://advisor:9000");
        assert_eq!(
            resolve_api_url(Some("http://other".into()), &config),
            "http://other"
        );
        assert_eq!(
            resolve_store_path(None, &config).unwrap(),
            PathBuf::from("/tmp/s.json")
        );
        assert_eq!(resolve_api_url(None, &Config::default()), DEFAULT_API_URL);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
