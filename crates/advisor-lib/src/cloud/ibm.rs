//! IBM Cloud Kubernetes Service client
//!
//! This module provides a [`ClusterSource`] backed by the provider REST API:
//! - Exchanges an API key for an IAM bearer token and caches it until near expiry
//! - Sends the region header the service requires
//! - Retries transient failures (network errors, 429, 5xx) with capped exponential backoff

use super::{ClusterDetails, ClusterSource, ClusterSummary, WorkerRecord};
use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Refresh tokens this long before the provider says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Configuration for the IBM Cloud client
#[derive(Debug, Clone)]
pub struct IbmClientConfig {
    pub api_key: String,
    /// Region sent as `X-Region` (e.g. "us-south")
    pub region: String,
    pub api_base_url: String,
    pub iam_token_url: String,
    pub request_timeout: Duration,
    /// Attempts per request including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for IbmClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            region: "us-south".to_string(),
            api_base_url: "https://containers.cloud.ibm.com/global/v1".to_string(),
            iam_token_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl IbmClientConfig {
    /// Build from `IBM_CLOUD_API_KEY` and `IBM_CLOUD_REGION`
    ///
    /// Returns [`AdvisorError::NotConfigured`] when no API key is set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("IBM_CLOUD_API_KEY").unwrap_or_default();
        let region = std::env::var("IBM_CLOUD_REGION").ok();
        Self::with_credentials(api_key, region)
    }

    pub fn with_credentials(api_key: impl Into<String>, region: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdvisorError::NotConfigured("IBM Cloud service".to_string()));
        }

        let mut config = Self {
            api_key,
            ..Self::default()
        };
        if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
            config.region = region;
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// REST client for cluster inventory
pub struct IbmCloudClient {
    config: IbmClientConfig,
    http: Client,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl IbmCloudClient {
    pub fn new(config: IbmClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        info!(region = %config.region, base_url = %config.api_base_url, "IBM Cloud client configured");

        Ok(Self {
            config,
            http,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Return a cached bearer token or fetch a new one
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting IAM access token");
        let response = self
            .http
            .post(&self.config.iam_token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", IAM_GRANT_TYPE),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: IamTokenResponse = response.json().await?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *slot = Some(CachedToken {
            value: body.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        info!(expires_in_secs = body.expires_in, "Obtained IAM access token");

        Ok(body.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base_url)?;
        url.path_segments_mut()
            .map_err(|_| AdvisorError::InvalidUrl(self.config.api_base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, url: Url, token: &str) -> RequestBuilder {
        self.http
            .get(url)
            .bearer_auth(token)
            .header("X-Region", &self.config.region)
            .header("Accept", "application/json")
    }

    /// GET a JSON document, retrying transient failures
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 1;

        loop {
            match self.try_get(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(AdvisorError::CloudApi { status: 401, .. }) if attempt < self.config.max_attempts => {
                    warn!(url = %url, "Access token rejected, refreshing");
                    self.invalidate_token().await;
                }
                Err(e) if e.is_transient() && attempt < self.config.max_attempts => {
                    warn!(
                        url = %url,
                        attempt = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.config.max_backoff);
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let token = self.access_token().await?;
        let response = self.authorized(url, &token).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(AdvisorError::CloudApi {
        status: status.as_u16(),
        message: if message.is_empty() {
            status.to_string()
        } else {
            message
        },
    })
}

#[async_trait]
impl ClusterSource for IbmCloudClient {
    async fn list_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let clusters: Vec<ClusterSummary> = self.get_json(&["clusters"]).await?;
        debug!(count = clusters.len(), "Listed clusters");
        Ok(clusters)
    }

    async fn cluster_details(&self, id: &str) -> Result<ClusterDetails> {
        let cluster: ClusterSummary = self.get_json(&["clusters", id]).await?;
        let workers: Vec<WorkerRecord> = self.get_json(&["clusters", id, "workers"]).await?;
        Ok(ClusterDetails { cluster, workers })
    }
}
