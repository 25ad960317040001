//! Service configuration

use advisor_lib::cloud::IbmClientConfig;
use advisor_lib::AdvisorError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Sizing advisor service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    /// Instance name attached to log records
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Port for the API, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Catalog document replacing the embedded one
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// JSON file backing the scenario store
    #[serde(default = "default_scenario_store_path")]
    pub scenario_store_path: PathBuf,

    /// Directory generated reports are written to
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    #[serde(default)]
    pub ibm_cloud_api_key: Option<String>,

    #[serde(default)]
    pub ibm_cloud_region: Option<String>,

    /// Concurrent cluster detail fetches
    #[serde(default = "default_fetch_concurrency")]
    pub cluster_fetch_concurrency: usize,

    /// Timeout for each cloud API request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_instance() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "sizing-advisor".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_scenario_store_path() -> PathBuf {
    PathBuf::from("data/scenarios.json")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_fetch_concurrency() -> usize {
    4
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            instance: default_instance(),
            api_port: default_api_port(),
            catalog_path: None,
            scenario_store_path: default_scenario_store_path(),
            report_dir: default_report_dir(),
            ibm_cloud_api_key: None,
            ibm_cloud_region: None,
            cluster_fetch_concurrency: default_fetch_concurrency(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from `ADVISOR_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ADVISOR"))
            .build()
            .context("failed to read ADVISOR_* environment")?;

        let mut loaded: AdvisorConfig = config
            .try_deserialize()
            .context("invalid sizing advisor configuration")?;

        if loaded.ibm_cloud_api_key.is_none() {
            loaded.ibm_cloud_api_key = std::env::var("IBM_CLOUD_API_KEY").ok();
        }
        if loaded.ibm_cloud_region.is_none() {
            loaded.ibm_cloud_region = std::env::var("IBM_CLOUD_REGION").ok();
        }

        Ok(loaded)
    }

    /// Cloud client settings, or `NotConfigured` when no API key is set
    pub fn cloud_client_config(&self) -> std::result::Result<IbmClientConfig, AdvisorError> {
        let mut client = IbmClientConfig::with_credentials(
            self.ibm_cloud_api_key.clone().unwrap_or_default(),
            self.ibm_cloud_region.clone(),
        )?;
        client.request_timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.cluster_fetch_concurrency, 4);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.report_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_cloud_requires_api_key() {
        let config = AdvisorConfig::default();
        assert!(matches!(
            config.cloud_client_config(),
            Err(AdvisorError::NotConfigured(_))
        ));

        let configured = AdvisorConfig {
            ibm_cloud_api_key: Some("key".into()),
            ibm_cloud_region: Some("eu-de".into()),
            request_timeout_secs: 5,
            ..AdvisorConfig::default()
        };
        let client = configured.cloud_client_config().unwrap();
        assert_eq!(client.region, "eu-de");
        assert_eq!(client.request_timeout, Duration::from_secs(5));
    }
}
