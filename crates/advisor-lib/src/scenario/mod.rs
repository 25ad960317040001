//! Saved scenarios
//!
//! A scenario is a named snapshot of a baseline, flavor and zone selection
//! together with the advisory result computed for it. The store keeps at
//! most [`MAX_SCENARIOS`] of them, evicting the oldest-created first, and
//! persists them as one JSON document through a [`ScenarioBackend`].

mod backend;
mod store;


pub use backend::{FileBackend, MemoryBackend, ScenarioBackend};
pub use store::{
    DeleteOutcome, ImportOutcome, SaveOutcome, ScenarioStats, ScenarioStore, DEGRADED_CAPACITY,
    MAX_SCENARIOS,
};

use crate::advisor::AdvisoryResult;
use crate::costing::ScoreLevel;
use crate::models::{BaselineProfile, NodeFlavor, ZoneCount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot format version
pub const STORAGE_VERSION: &str = "1.0";

/// Reference to a catalog entry by id and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub id: String,
    pub name: String,
}

/// A saved selection and its computed result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Empty until the store assigns one
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub baseline: ScenarioRef,
    pub flavor: ScenarioRef,
    pub zones: ZoneCount,
    pub results: AdvisoryResult,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        notes: Option<String>,
        baseline: &BaselineProfile,
        flavor: &NodeFlavor,
        zones: ZoneCount,
        results: AdvisoryResult,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
            baseline: ScenarioRef {
                id: baseline.id.clone(),
                name: baseline.name.clone(),
            },
            flavor: ScenarioRef {
                id: flavor.id.clone(),
                name: flavor.name.clone(),
            },
            zones,
            results,
        }
    }

    pub fn score(&self) -> ScoreLevel {
        self.results.score.level
    }

    pub fn monthly_cost(&self) -> f64 {
        self.results.costs.total.monthly
    }

    /// Case-insensitive match on name, baseline name and notes
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.baseline.name.to_lowercase().contains(&query)
            || self
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&query))
    }
}

/// Bookkeeping stored next to the scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub last_modified: DateTime<Utc>,
    pub scenario_count: usize,
}

/// Persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub scenarios: Vec<Scenario>,
    pub metadata: SnapshotMetadata,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION.to_string(),
            scenarios: Vec::new(),
            metadata: SnapshotMetadata {
                last_modified: Utc::now(),
                scenario_count: 0,
            },
        }
    }
}

/// Document produced by export and accepted by import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioExport {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub scenario_count: usize,
    pub scenarios: Vec<Scenario>,
}
