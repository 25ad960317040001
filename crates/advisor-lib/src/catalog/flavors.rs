use super::{ValidationIssue, ValidationReport};
use crate::error::{AdvisorError, Result};
use crate::models::{BaselineProfile, FlavorSeries, NodeFlavor, Priority, Severity};
use serde::{Deserialize, Serialize};

/// Over-provisioning factor above which a flavor is flagged
const OVERSIZE_FACTOR: f64 = 1.5;

/// Read-only lookup over the node flavors
#[derive(Debug, Clone, Default)]
pub struct FlavorCatalog {
    flavors: Vec<NodeFlavor>,
}

impl FlavorCatalog {
    pub fn new(flavors: Vec<NodeFlavor>) -> Self {
        Self { flavors }
    }

    pub fn get(&self, id: &str) -> Option<&NodeFlavor> {
        self.flavors.iter().find(|f| f.id == id)
    }

    /// Look up by provider name such as `bx2.16x32`
    pub fn by_name(&self, name: &str) -> Option<&NodeFlavor> {
        self.flavors.iter().find(|f| f.name == name)
    }

    /// Resolve either an id or a provider name
    pub fn require(&self, id_or_name: &str) -> Result<&NodeFlavor> {
        self.get(id_or_name)
            .or_else(|| self.by_name(id_or_name))
            .ok_or_else(|| AdvisorError::UnknownFlavor(id_or_name.to_string()))
    }

    pub fn all(&self) -> &[NodeFlavor] {
        &self.flavors
    }

    pub fn by_series(&self, series: FlavorSeries) -> Vec<&NodeFlavor> {
        self.flavors.iter().filter(|f| f.series == series).collect()
    }
}

/// A suggested flavor for a baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorSuggestion {
    /// `None` when nothing in the catalog satisfies the baseline
    pub flavor: Option<NodeFlavor>,
    pub reason: String,
    pub priority: Priority,
}

/// Suggest flavors that satisfy a baseline's vCPU and RAM minimums
///
/// Candidates are ranked by surplus resources (extra vCPU plus extra GB of
/// RAM), ties broken by hourly rate. The result holds the best match, the
/// first dense-series alternative and the cheapest qualifying flavor, each
/// only when distinct from the best match.
pub fn recommend_flavors(catalog: &FlavorCatalog, baseline: &BaselineProfile) -> Vec<FlavorSuggestion> {
    let mut suitable: Vec<&NodeFlavor> = catalog
        .all()
        .iter()
        .filter(|f| f.vcpu >= baseline.vcpu && f.ram_gb >= baseline.ram_gb)
        .collect();

    if suitable.is_empty() {
        return vec![FlavorSuggestion {
            flavor: None,
            reason: "No single flavor meets the requirements. Consider using larger flavors or adjusting configuration.".into(),
            priority: Priority::High,
        }];
    }

    let overhead = |f: &NodeFlavor| -> u64 {
        u64::from(f.vcpu - baseline.vcpu) + u64::from(f.ram_gb - baseline.ram_gb)
    };
    suitable.sort_by(|a, b| {
        overhead(a)
            .cmp(&overhead(b))
            .then(a.hourly_rate.total_cmp(&b.hourly_rate))
    });

    let best = suitable[0];
    let mut suggestions = vec![FlavorSuggestion {
        flavor: Some(best.clone()),
        reason: "Best cost-performance match for your requirements".into(),
        priority: Priority::High,
    }];

    if let Some(dense) = suitable
        .iter()
        .find(|f| !f.series.is_lower_density() && f.id != best.id)
    {
        suggestions.push(FlavorSuggestion {
            flavor: Some((*dense).clone()),
            reason: "Higher memory density option for memory-intensive workloads".into(),
            priority: Priority::Medium,
        });
    }

    if let Some(cheapest) = suitable
        .iter()
        .min_by(|a, b| a.hourly_rate.total_cmp(&b.hourly_rate))
        .filter(|f| f.id != best.id)
    {
        suggestions.push(FlavorSuggestion {
            flavor: Some((*cheapest).clone()),
            reason: "Most cost-effective option meeting minimum requirements".into(),
            priority: Priority::Low,
        });
    }

    suggestions
}

/// Check a flavor against a baseline's per-node minimums
pub fn validate_flavor(flavor: &NodeFlavor, baseline: &BaselineProfile) -> ValidationReport {
    let mut issues = Vec::new();

    if flavor.vcpu < baseline.vcpu {
        issues.push(ValidationIssue {
            field: "vcpu".into(),
            severity: Severity::High,
            message: format!(
                "Flavor vCPU ({}) below configuration requirement ({})",
                flavor.vcpu, baseline.vcpu
            ),
        });
    }
    if flavor.ram_gb < baseline.ram_gb {
        issues.push(ValidationIssue {
            field: "ram".into(),
            severity: Severity::High,
            message: format!(
                "Flavor RAM ({}GB) below configuration requirement ({}GB)",
                flavor.ram_gb, baseline.ram_gb
            ),
        });
    }
    if f64::from(flavor.vcpu) > f64::from(baseline.vcpu) * OVERSIZE_FACTOR {
        issues.push(ValidationIssue {
            field: "vcpu".into(),
            severity: Severity::Low,
            message: format!(
                "Flavor may be over-provisioned for vCPU ({} vs {} required)",
                flavor.vcpu, baseline.vcpu
            ),
        });
    }
    if f64::from(flavor.ram_gb) > f64::from(baseline.ram_gb) * OVERSIZE_FACTOR {
        issues.push(ValidationIssue {
            field: "ram".into(),
            severity: Severity::Low,
            message: format!(
                "Flavor may be over-provisioned for RAM ({}GB vs {}GB required)",
                flavor.ram_gb, baseline.ram_gb
            ),
        });
    }

    ValidationReport::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_lookup_by_id_and_name() {
        let catalog = Catalog::embedded().unwrap();

        let by_id = catalog.flavors.get("bx2-16x32").unwrap();
        let by_name = catalog.flavors.by_name("bx2.16x32").unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.hourly_rate, 0.74);
        assert_eq!(by_id.network, "24Gbps");
        assert_eq!(catalog.flavors.require("bx3d.176x1760").unwrap().hourly_rate, 19.68);
        assert!(matches!(
            catalog.flavors.require("cx2.2x4"),
            Err(AdvisorError::UnknownFlavor(_))
        ));
    }

    #[test]
    fn test_recommend_for_standard_baseline() {
        let catalog = Catalog::embedded().unwrap();
        let baseline = catalog.baselines.require("config-1").unwrap();

        let suggestions = recommend_flavors(&catalog.flavors, baseline);

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].flavor.as_ref().unwrap().id, "bx2-16x32");
        assert_eq!(suggestions[0].priority, Priority::High);
        assert_eq!(suggestions[1].flavor.as_ref().unwrap().id, "bx3d-16x80");
        assert_eq!(suggestions[1].priority, Priority::Medium);
    }

    #[test]
    fn test_recommend_includes_cheapest_when_distinct() {
        let catalog = Catalog::embedded().unwrap();
        let baseline = BaselineProfile::custom("tiny", 1, 4, 18, 100).unwrap();

        let suggestions = recommend_flavors(&catalog.flavors, &baseline);

        // bx3d.4x20 is both the closest fit and the cheapest
        assert_eq!(suggestions[0].flavor.as_ref().unwrap().id, "bx3d-4x20");
        assert!(suggestions.iter().all(|s| s.priority != Priority::Low));
    }

    #[test]
    fn test_recommend_when_nothing_fits() {
        let catalog = Catalog::embedded().unwrap();
        let baseline = BaselineProfile::custom("huge", 3, 512, 4096, 100).unwrap();

        let suggestions = recommend_flavors(&catalog.flavors, &baseline);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].flavor.is_none());
        assert_eq!(suggestions[0].priority, Priority::High);
    }

    #[test]
    fn test_validate_flavor() {
        let catalog = Catalog::embedded().unwrap();
        let baseline = catalog.baselines.require("config-1").unwrap();

        let exact = validate_flavor(catalog.flavors.require("bx2-16x32").unwrap(), baseline);
        assert!(exact.valid);
        assert!(exact.issues.is_empty());

        let small = validate_flavor(catalog.flavors.require("bx2-8x32").unwrap(), baseline);
        assert!(!small.valid);
        assert_eq!(small.issues[0].field, "vcpu");

        let large = validate_flavor(catalog.flavors.require("bx2-32x128").unwrap(), baseline);
        assert!(large.valid);
        assert_eq!(large.issues.len(), 2);
        assert!(large.issues.iter().all(|i| i.severity == Severity::Low));
    }
}
