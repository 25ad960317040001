//! Static reference catalogs
//!
//! Baselines, flavors and the cloud price table are read from a versioned
//! JSON document. The default document is embedded at build time; a
//! replacement can be loaded from disk at startup. Catalogs are immutable
//! once loaded.

mod baselines;
mod flavors;

pub use baselines::{validate_baseline_input, BaselineCatalog, BaselineInput};
pub use flavors::{recommend_flavors, validate_flavor, FlavorCatalog, FlavorSuggestion};

use crate::cluster::PriceTable;
use crate::error::{AdvisorError, Result};
use crate::models::{BaselineProfile, NodeFlavor, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// Catalog document shipped with the crate
const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

/// On-disk shape of the catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogDocument {
    catalog_version: String,
    #[serde(default = "default_currency")]
    currency: String,
    baselines: Vec<BaselineProfile>,
    flavors: Vec<NodeFlavor>,
    #[serde(default)]
    cloud_pricing: BTreeMap<String, f64>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// All reference data needed by the advisor
#[derive(Debug, Clone)]
pub struct Catalog {
    pub version: String,
    pub currency: String,
    pub baselines: BaselineCatalog,
    pub flavors: FlavorCatalog,
    pub cloud_pricing: PriceTable,
}

impl Catalog {
    /// Load the catalog compiled into the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load a catalog document from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            version = %catalog.version,
            "Loaded catalog from file"
        );
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise the embedded catalog
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::embedded(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_str(content)?;
        validate_document(&doc)?;

        Ok(Self {
            version: doc.catalog_version,
            currency: doc.currency,
            baselines: BaselineCatalog::new(doc.baselines),
            flavors: FlavorCatalog::new(doc.flavors),
            cloud_pricing: PriceTable::new(doc.cloud_pricing),
        })
    }
}

fn validate_document(doc: &CatalogDocument) -> Result<()> {
    let mut seen = HashSet::new();
    for baseline in &doc.baselines {
        if !seen.insert(baseline.id.as_str()) {
            return Err(AdvisorError::Catalog(format!(
                "duplicate baseline id {}",
                baseline.id
            )));
        }
        baseline.validate()?;
    }

    let mut seen = HashSet::new();
    for flavor in &doc.flavors {
        if !seen.insert(flavor.id.as_str()) {
            return Err(AdvisorError::Catalog(format!(
                "duplicate flavor id {}",
                flavor.id
            )));
        }
        if !flavor.hourly_rate.is_finite() || flavor.hourly_rate < 0.0 {
            return Err(AdvisorError::Catalog(format!(
                "flavor {} has invalid hourly rate {}",
                flavor.id, flavor.hourly_rate
            )));
        }
    }

    if let Some((name, price)) = doc
        .cloud_pricing
        .iter()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(AdvisorError::Catalog(format!(
            "cloud price for {} is invalid: {}",
            name, price
        )));
    }

    Ok(())
}

/// One problem found when checking a selection against a baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

/// Outcome of a validation; valid when no high-severity issue exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues.iter().any(|i| i.severity == Severity::High);
        Self { valid, issues }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlavorSeries;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();

        assert_eq!(catalog.baselines.all().len(), 6);
        assert_eq!(catalog.flavors.all().len(), 42);
        assert_eq!(catalog.flavors.by_series(FlavorSeries::Bx2).len(), 22);
        assert_eq!(catalog.flavors.by_series(FlavorSeries::Bx3d).len(), 20);
        assert_eq!(catalog.currency, "USD");
        assert_eq!(catalog.cloud_pricing.get("bx3d.16x64"), Some(0.59));
    }

    #[test]
    fn test_catalog_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, EMBEDDED_CATALOG).unwrap();

        let catalog = Catalog::load(Some(&path)).unwrap();
        assert_eq!(catalog.version, Catalog::embedded().unwrap().version);
    }

    #[test]
    fn test_duplicate_flavor_rejected() {
        let doc = r#"{
            "catalog_version": "test",
            "baselines": [],
            "flavors": [
                {"id": "a", "name": "bx2.4x16", "series": "bx2", "vcpu": 4, "ram_gb": 16,
                 "storage_gb": 100, "storage_type": "BLOCK", "network": "8Gbps", "hourly_rate": 0.28},
                {"id": "a", "name": "bx2.4x16", "series": "bx2", "vcpu": 4, "ram_gb": 16,
                 "storage_gb": 100, "storage_type": "BLOCK", "network": "8Gbps", "hourly_rate": 0.28}
            ]
        }"#;

        assert!(matches!(
            Catalog::from_json(doc),
            Err(AdvisorError::Catalog(_))
        ));
    }

    #[test]
    fn test_zero_worker_baseline_rejected() {
        let doc = r#"{
            "catalog_version": "test",
            "baselines": [
                {"id": "b", "name": "Broken", "components": ["Core"], "workers": 0,
                 "vcpu": 4, "ram_gb": 16, "disk_gb": 100}
            ],
            "flavors": []
        }"#;

        assert!(matches!(
            Catalog::from_json(doc),
            Err(AdvisorError::InvalidBaseline(_))
        ));
    }
}
