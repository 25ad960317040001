//! Deploy seam for publishing a configuration to source control
//!
//! The advisor only shapes the request: commit message, pull request title
//! and body. Pushing `cluster.env` / `mas.env` and opening the pull request
//! belongs to a [`DeployTarget`] implementation.

use crate::advisor::AdvisoryResult;
use crate::error::{AdvisorError, Result};
use crate::models::{BaselineProfile, NodeFlavor, ZoneCount};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Branch pull requests are opened against
pub const DEFAULT_BASE_BRANCH: &str = "main";

const NOT_AVAILABLE: &str = "N/A";

/// What is being deployed, as shown in the pull request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationSummary {
    pub name: Option<String>,
    pub cost_score: Option<String>,
    pub monthly_cost: Option<f64>,
    pub workers: Option<u64>,
    pub flavor: Option<String>,
    pub zones: Option<u8>,
    pub components: Vec<String>,
}

impl ConfigurationSummary {
    /// Summarize an advisory run for the selected baseline and flavor
    pub fn from_advisory(
        baseline: &BaselineProfile,
        flavor: &NodeFlavor,
        zones: ZoneCount,
        result: &AdvisoryResult,
    ) -> Self {
        Self {
            name: Some(baseline.name.clone()),
            cost_score: Some(result.score.level.as_str().to_string()),
            monthly_cost: Some(result.costs.total.monthly),
            workers: Some(result.costs.total_nodes),
            flavor: Some(flavor.name.clone()),
            zones: Some(zones.get()),
            components: baseline.components.clone(),
        }
    }
}

/// Payload handed to a [`DeployTarget`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub configuration: ConfigurationSummary,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Contents of `cluster.env`
    pub cluster_env: String,
    /// Contents of `mas.env`
    pub mas_env: String,
}

impl DeployRequest {
    /// Reject requests missing a branch or either env payload
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("cluster_env", self.cluster_env.trim().is_empty()),
            ("mas_env", self.mas_env.trim().is_empty()),
            ("branch", self.branch.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, empty)| empty.then_some(field))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::InvalidDeploy(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    fn configuration_name(&self) -> &str {
        self.configuration.name.as_deref().unwrap_or("Custom")
    }

    /// Explicit message, or one naming the configuration
    pub fn commit_message(&self) -> String {
        match &self.commit_message {
            Some(message) if !message.trim().is_empty() => message.clone(),
            _ => format!("Update PFVT configuration - {}", self.configuration_name()),
        }
    }

    pub fn pull_request_title(&self) -> String {
        format!(
            "PFVT: {}",
            self.configuration
                .name
                .as_deref()
                .unwrap_or("Configuration Update")
        )
    }

    /// Markdown body listing cost and cluster shape
    pub fn pull_request_body(&self) -> String {
        let config = &self.configuration;
        let components = if config.components.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            config.components.join(", ")
        };

        format!(
            "## PFVT Configuration Update\n\n\
             **Configuration:** {name}\n\
             **Cost Score:** {score}\n\
             **Estimated Monthly Cost:** ${monthly}\n\n\
             ### Cluster Configuration\n\
             - **Workers:** {workers}\n\
             - **Flavor:** {flavor}\n\
             - **Zones:** {zones}\n\n\
             ### Components\n\
             {components}\n\n\
             ---\n\
             *Generated by IBM MAS PFVT Cost & Sizing Advisor*",
            name = self.configuration_name(),
            score = config.cost_score.as_deref().unwrap_or(NOT_AVAILABLE),
            monthly = or_not_available(config.monthly_cost.map(|c| format!("{:.2}", c))),
            workers = or_not_available(config.workers.map(|w| w.to_string())),
            flavor = config.flavor.as_deref().unwrap_or(NOT_AVAILABLE),
            zones = or_not_available(config.zones.map(|z| z.to_string())),
            components = components,
        )
    }
}

/// Where the deployed configuration landed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployReference {
    pub branch: String,
    pub repo_url: String,
    /// Absent when the pull request could not be opened
    pub pr_url: Option<String>,
}

/// Source-control integration that publishes a [`DeployRequest`]
#[async_trait]
pub trait DeployTarget: Send + Sync {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployReference>;
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
