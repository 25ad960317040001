//! Scenario store: retention, search and import/export over a backend

use super::{Scenario, ScenarioBackend, ScenarioExport, Snapshot, STORAGE_VERSION};
use crate::costing::ScoreLevel;
use crate::error::{AdvisorError, Result};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

/// Retention bound
pub const MAX_SCENARIOS: usize = 100;
/// Bound applied before retrying a failed write
pub const DEGRADED_CAPACITY: usize = 50;

/// Result of [`ScenarioStore::save`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub id: Option<String>,
    pub message: String,
}

/// Result of [`ScenarioStore::delete`] and [`ScenarioStore::delete_all`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

/// Result of [`ScenarioStore::import_all`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub imported_count: usize,
    pub message: String,
}

/// Store statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStats {
    pub total_scenarios: usize,
    pub max_scenarios: usize,
    pub utilization_percent: f64,
    pub cost_scores: BTreeMap<String, usize>,
    pub average_monthly_cost: f64,
    pub min_monthly_cost: f64,
    pub max_monthly_cost: f64,
    pub last_modified: DateTime<Utc>,
}

/// Scenario store backed by a single JSON snapshot
///
/// Every mutation rewrites the snapshot. Failures never escape as errors
/// from mutating calls; they are reported in the returned outcome and the
/// in-memory state is rolled back.
pub struct ScenarioStore {
    backend: Box<dyn ScenarioBackend>,
    snapshot: Snapshot,
    capacity: usize,
    metrics: AdvisorMetrics,
    logger: StructuredLogger,
}

impl ScenarioStore {
    /// Open a store, starting empty when the stored data is unusable
    pub fn open(backend: impl ScenarioBackend + 'static) -> Self {
        let snapshot = match backend.read() {
            Ok(Some(content)) => match serde_json::from_str::<Snapshot>(&content) {
                Ok(snapshot) if snapshot.version == STORAGE_VERSION => snapshot,
                Ok(snapshot) => {
                    warn!(
                        version = %snapshot.version,
                        expected = STORAGE_VERSION,
                        "Scenario snapshot version mismatch, starting fresh"
                    );
                    Snapshot::default()
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse scenario snapshot, starting fresh");
                    Snapshot::default()
                }
            },
            Ok(None) => Snapshot::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read scenario snapshot, starting fresh");
                Snapshot::default()
            }
        };

        info!(scenarios = snapshot.scenarios.len(), "Scenario store opened");

        let metrics = AdvisorMetrics::new();
        metrics.set_scenarios_stored(snapshot.scenarios.len() as i64);

        Self {
            backend: Box::new(backend),
            snapshot,
            capacity: MAX_SCENARIOS,
            metrics,
            logger: StructuredLogger::new("scenario-store"),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.scenarios.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert or replace a scenario by id
    ///
    /// A missing id is assigned. New entries beyond the retention bound
    /// evict the oldest-created scenarios. A failed write is retried once
    /// after shrinking to [`DEGRADED_CAPACITY`].
    pub fn save(&mut self, mut scenario: Scenario) -> SaveOutcome {
        let previous = self.snapshot.clone();

        if scenario.id.is_empty() {
            scenario.id = generate_scenario_id();
        }
        scenario.updated_at = Utc::now();
        let id = scenario.id.clone();
        let name = scenario.name.clone();

        let scenarios = &mut self.snapshot.scenarios;
        match scenarios.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = scenario,
            None => {
                scenarios.push(scenario);
                if scenarios.len() > self.capacity {
                    self.retain_newest(self.capacity);
                }
            }
        }

        if self.persist_with_retry() {
            self.logger.log_scenario_saved(&id, &name, self.len());
            SaveOutcome {
                success: true,
                id: Some(id),
                message: "Scenario saved successfully".to_string(),
            }
        } else {
            self.restore(previous);
            SaveOutcome {
                success: false,
                id: None,
                message: "Failed to save scenario".to_string(),
            }
        }
    }

    pub fn load(&self, id: &str) -> Option<&Scenario> {
        self.snapshot.scenarios.iter().find(|s| s.id == id)
    }

    /// Like [`load`](Self::load) but with a not-found error
    pub fn require(&self, id: &str) -> Result<&Scenario> {
        self.load(id)
            .ok_or_else(|| AdvisorError::ScenarioNotFound(id.to_string()))
    }

    /// All scenarios, newest-created first
    pub fn load_all(&self) -> Vec<&Scenario> {
        let mut all: Vec<&Scenario> = self.snapshot.scenarios.iter().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub fn delete(&mut self, id: &str) -> DeleteOutcome {
        let previous = self.snapshot.clone();
        self.snapshot.scenarios.retain(|s| s.id != id);
        let deleted = self.snapshot.scenarios.len() < previous.scenarios.len();

        if !deleted {
            return DeleteOutcome {
                success: false,
                message: "Scenario not found".to_string(),
            };
        }

        if self.persist() {
            DeleteOutcome {
                success: true,
                message: "Scenario deleted successfully".to_string(),
            }
        } else {
            self.restore(previous);
            DeleteOutcome {
                success: false,
                message: "Failed to delete scenario".to_string(),
            }
        }
    }

    pub fn delete_all(&mut self) -> DeleteOutcome {
        let previous = std::mem::take(&mut self.snapshot);

        if self.persist() {
            DeleteOutcome {
                success: true,
                message: "All scenarios deleted".to_string(),
            }
        } else {
            self.restore(previous);
            DeleteOutcome {
                success: false,
                message: "Failed to delete scenarios".to_string(),
            }
        }
    }

    /// Case-insensitive substring match over name, baseline name and notes
    pub fn search(&self, query: &str) -> Vec<&Scenario> {
        self.load_all()
            .into_iter()
            .filter(|s| s.matches(query))
            .collect()
    }

    /// Scenarios created within `[start, end]`
    pub fn filter_by_date(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Scenario> {
        self.load_all()
            .into_iter()
            .filter(|s| s.created_at >= start && s.created_at <= end)
            .collect()
    }

    pub fn filter_by_score(&self, level: ScoreLevel) -> Vec<&Scenario> {
        self.load_all()
            .into_iter()
            .filter(|s| s.score() == level)
            .collect()
    }

    pub fn stats(&self) -> ScenarioStats {
        let scenarios = &self.snapshot.scenarios;
        let costs: Vec<f64> = scenarios.iter().map(Scenario::monthly_cost).collect();

        let mut cost_scores = BTreeMap::new();
        for scenario in scenarios {
            *cost_scores
                .entry(scenario.score().as_str().to_string())
                .or_insert(0) += 1;
        }

        let (average, min, max) = if costs.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                costs.iter().sum::<f64>() / costs.len() as f64,
                costs.iter().copied().fold(f64::INFINITY, f64::min),
                costs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };

        ScenarioStats {
            total_scenarios: scenarios.len(),
            max_scenarios: self.capacity,
            utilization_percent: scenarios.len() as f64 / self.capacity as f64 * 100.0,
            cost_scores,
            average_monthly_cost: average,
            min_monthly_cost: min,
            max_monthly_cost: max,
            last_modified: self.snapshot.metadata.last_modified,
        }
    }

    /// Keep only the `limit` newest scenarios
    pub fn enforce_limit(&mut self, limit: usize) -> bool {
        if self.len() <= limit {
            return true;
        }
        let previous = self.snapshot.clone();
        self.retain_newest(limit);
        if self.persist() {
            true
        } else {
            self.restore(previous);
            false
        }
    }

    /// Serialize every scenario, newest first
    pub fn export_all(&self) -> Result<String> {
        self.export(self.load_all())
    }

    /// Serialize the listed scenarios; unknown ids are skipped
    pub fn export_selected(&self, ids: &[String]) -> Result<String> {
        if ids.is_empty() {
            return self.export_all();
        }
        self.export(ids.iter().filter_map(|id| self.load(id)).collect())
    }

    fn export(&self, scenarios: Vec<&Scenario>) -> Result<String> {
        let export = ScenarioExport {
            export_date: Utc::now(),
            version: STORAGE_VERSION.to_string(),
            scenario_count: scenarios.len(),
            scenarios: scenarios.into_iter().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Import an export document; every scenario gets a fresh id
    ///
    /// The batch is written once. Scenarios evicted by the retention bound
    /// in the same pass are not counted as imported.
    pub fn import_all(&mut self, content: &str) -> Result<ImportOutcome> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| AdvisorError::InvalidImport(e.to_string()))?;
        let entries = value
            .get("scenarios")
            .and_then(|s| s.as_array())
            .ok_or_else(|| AdvisorError::InvalidImport("Invalid import data format".to_string()))?;

        let total = entries.len();
        let now = Utc::now();
        let incoming: Vec<Scenario> = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<Scenario>(entry.clone()) {
                Ok(mut scenario) => {
                    scenario.id = generate_scenario_id();
                    scenario.updated_at = now;
                    Some(scenario)
                }
                Err(e) => {
                    warn!(error = %e, "Skipping malformed scenario in import");
                    None
                }
            })
            .collect();

        if incoming.is_empty() {
            return Ok(ImportOutcome {
                success: false,
                imported_count: 0,
                message: format!("Imported 0 of {} scenarios", total),
            });
        }

        let previous = self.snapshot.clone();
        let incoming_ids: HashSet<String> = incoming.iter().map(|s| s.id.clone()).collect();
        self.snapshot.scenarios.extend(incoming);
        if self.len() > self.capacity {
            self.retain_newest(self.capacity);
        }

        if !self.persist_with_retry() {
            self.restore(previous);
            return Ok(ImportOutcome {
                success: false,
                imported_count: 0,
                message: "Failed to import scenarios".to_string(),
            });
        }

        let imported = self
            .snapshot
            .scenarios
            .iter()
            .filter(|s| incoming_ids.contains(&s.id))
            .count();
        info!(imported, total, stored = self.len(), "Scenario import persisted");

        Ok(ImportOutcome {
            success: imported > 0,
            imported_count: imported,
            message: format!("Imported {} of {} scenarios", imported, total),
        })
    }

    fn retain_newest(&mut self, limit: usize) {
        let scenarios = &mut self.snapshot.scenarios;
        if scenarios.len() <= limit {
            return;
        }

        let mut by_age: Vec<(DateTime<Utc>, String)> = scenarios
            .iter()
            .map(|s| (s.created_at, s.id.clone()))
            .collect();
        by_age.sort_by(|a, b| b.0.cmp(&a.0));
        let keep: HashSet<String> = by_age.into_iter().take(limit).map(|(_, id)| id).collect();

        let before = scenarios.len();
        scenarios.retain(|s| keep.contains(&s.id));
        let evicted = before - scenarios.len();

        self.metrics.inc_scenarios_evicted(evicted as u64);
        self.logger.log_scenarios_evicted(evicted, scenarios.len());
    }

    fn persist_with_retry(&mut self) -> bool {
        if self.persist() {
            return true;
        }
        self.retain_newest(DEGRADED_CAPACITY);
        self.persist()
    }

    fn persist(&mut self) -> bool {
        self.snapshot.metadata.last_modified = Utc::now();
        self.snapshot.metadata.scenario_count = self.snapshot.scenarios.len();

        let result = serde_json::to_string(&self.snapshot)
            .map_err(AdvisorError::from)
            .and_then(|data| self.backend.write(&data));

        match result {
            Ok(()) => {
                self.metrics.set_scenarios_stored(self.len() as i64);
                true
            }
            Err(e) => {
                self.logger.log_store_write_failed(&e.to_string(), true);
                false
            }
        }
    }

    fn restore(&mut self, previous: Snapshot) {
        self.snapshot = previous;
        self.metrics.set_scenarios_stored(self.len() as i64);
    }
}

fn generate_scenario_id() -> String {
    format!("scenario-{}", Uuid::new_v4())
}
