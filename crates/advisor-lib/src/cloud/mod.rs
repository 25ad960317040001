//! Cloud cluster inventory
//!
//! Defines the records returned by the provider and the [`ClusterSource`]
//! seam the cluster analyzer reads from. Provider field names vary between
//! API versions, so records keep each alternative and resolve them through
//! accessor methods.

mod ibm;

pub use ibm::{IbmClientConfig, IbmCloudClient};

use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cluster as listed by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSummary {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub created_date: Option<String>,
    pub created: Option<String>,
    pub worker_count: Option<u32>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub resource_group_name: Option<String>,
}

impl ClusterSummary {
    /// Creation timestamp from whichever field is populated
    pub fn created_at(&self) -> Option<&str> {
        self.created_date.as_deref().or(self.created.as_deref())
    }

    pub fn location_or_region(&self) -> Option<&str> {
        self.location.as_deref().or(self.region.as_deref())
    }
}

/// Worker node as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerRecord {
    pub id: String,
    pub state: Option<String>,
    pub flavor: Option<String>,
    pub machine_type: Option<String>,
    pub instance_type: Option<String>,
    pub location: Option<String>,
    pub zone: Option<String>,
    pub availability_zone: Option<String>,
    pub cpu: Option<u32>,
    /// GB
    pub memory: Option<u32>,
    /// GB
    pub disk: Option<u32>,
    pub storage: Option<u32>,
}

impl WorkerRecord {
    pub fn flavor_name(&self) -> Option<&str> {
        self.flavor
            .as_deref()
            .or(self.machine_type.as_deref())
            .or(self.instance_type.as_deref())
    }

    pub fn zone_name(&self) -> Option<&str> {
        self.location
            .as_deref()
            .or(self.zone.as_deref())
            .or(self.availability_zone.as_deref())
    }

    pub fn disk_gb(&self) -> Option<u32> {
        self.disk.or(self.storage)
    }
}

/// A cluster and its workers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterDetails {
    pub cluster: ClusterSummary,
    pub workers: Vec<WorkerRecord>,
}

/// Source of live cluster inventory
///
/// Implementations own authentication, timeouts and retries. Any error
/// returned marks the cluster unavailable for the current analysis.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    async fn list_clusters(&self) -> Result<Vec<ClusterSummary>>;

    async fn cluster_details(&self, id: &str) -> Result<ClusterDetails>;
}

/// Fixed inventory held in memory
///
/// Clusters registered through [`fail`](Self::fail) are listed but their
/// detail fetch returns an error.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterSource {
    clusters: Vec<ClusterDetails>,
    failures: HashMap<String, String>,
}

impl StaticClusterSource {
    pub fn new(clusters: Vec<ClusterDetails>) -> Self {
        Self {
            clusters,
            failures: HashMap::new(),
        }
    }

    /// Read a JSON array of [`ClusterDetails`]
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    pub fn fail(mut self, summary: ClusterSummary, reason: impl Into<String>) -> Self {
        self.failures.insert(summary.id.clone(), reason.into());
        self.clusters.push(ClusterDetails {
            cluster: summary,
            workers: Vec::new(),
        });
        self
    }
}

#[async_trait]
impl ClusterSource for StaticClusterSource {
    async fn list_clusters(&self) -> Result<Vec<ClusterSummary>> {
        Ok(self.clusters.iter().map(|c| c.cluster.clone()).collect())
    }

    async fn cluster_details(&self, id: &str) -> Result<ClusterDetails> {
        if let Some(reason) = self.failures.get(id) {
            return Err(AdvisorError::CloudApi {
                status: 503,
                message: reason.clone(),
            });
        }
        self.clusters
            .iter()
            .find(|c| c.cluster.id == id)
            .cloned()
            .ok_or_else(|| AdvisorError::CloudApi {
                status: 404,
                message: format!("cluster {} not found", id),
            })
    }
}
