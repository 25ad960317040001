//! API client for the sizing advisor service

use advisor_lib::cloud::ClusterSummary;
use advisor_lib::cluster::ClusterAggregate;
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for cloud-mode commands
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            // Account-wide analysis fetches every cluster
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    pub async fn list_clusters(&self) -> Result<Vec<ClusterSummary>> {
        self.get("api/v1/clusters").await
    }

    pub async fn analyze_clusters(&self) -> Result<ClusterAggregate> {
        self.post_empty("api/v1/clusters/analyze").await
    }

    /// Write a report for an aggregate already fetched
    pub async fn export_report(&self, aggregate: &ClusterAggregate) -> Result<ReportResponse> {
        self.post("api/v1/clusters/export", aggregate).await
    }

    /// Absolute download URL for a report path returned by the service
    pub fn download_url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid download path")
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        anyhow::bail!("API error ({}): {}", status, message);
    }

    response.json().await.context("Failed to parse response")
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub total_clusters: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aggregate_json() -> serde_json::Value {
        json!({
            "total_clusters": 0,
            "total_workers": 0,
            "total_monthly_cost": 0.0,
            "total_yearly_cost": 0.0,
            "total_cost_to_date": 0.0,
            "score_counts": {"green": 0, "amber": 0, "red": 0, "unpriced": 0},
            "clusters": [],
            "generated_at": "2024-03-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_clusters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/clusters")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "c1", "name": "prod", "workerCount": 3}]"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let clusters = client.list_clusters().await.unwrap();

        mock.assert_async().await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].worker_count, Some(3));
    }

    #[tokio::test]
    async fn test_not_configured_error_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/clusters/analyze")
            .with_status(503)
            .with_body(r#"{"error": "IBM Cloud service not configured", "code": "not_configured"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.analyze_clusters().await.unwrap_err().to_string();

        assert!(err.contains("503"));
        assert!(err.contains("IBM Cloud service not configured"));
    }

    #[tokio::test]
    async fn test_export_posts_aggregate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/clusters/export")
            .match_body(mockito::Matcher::PartialJson(json!({"total_clusters": 0})))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "filename": "ibm-cloud-cluster-analysis-2024-03-01.xlsx",
                    "path": "downloads/ibm-cloud-cluster-analysis-2024-03-01.xlsx",
                    "url": "/downloads/ibm-cloud-cluster-analysis-2024-03-01.xlsx",
                    "total_clusters": 0
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let aggregate: ClusterAggregate = serde_json::from_value(aggregate_json()).unwrap();
        let report = client.export_report(&aggregate).await.unwrap();

        mock.assert_async().await;
        assert!(report.success);
        let url = client.download_url(&report.url).unwrap();
        assert!(url.as_str().ends_with("/downloads/ibm-cloud-cluster-analysis-2024-03-01.xlsx"));
    }
}
