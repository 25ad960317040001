//! Rule-based recommendation engine
//!
//! Rule groups run in a fixed order (score, configuration, flavor, zones,
//! risks, best practices). The concatenated list is deduplicated by id,
//! keeping the first occurrence, then stably sorted by priority.

use crate::costing::{CostBreakdown, CostScore, ScoreLevel};
use crate::models::{
    BaselineProfile, NodeFlavor, Priority, RecommendationFinding, RecommendationKind, RiskFinding,
    Severity, ZoneCount,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Workers at or above which the deployment counts as large
const LARGE_DEPLOYMENT_WORKERS: u32 = 9;
/// Workers at or above which capacity planning is advised
const CAPACITY_PLANNING_WORKERS: u32 = 3;
/// Relative vCPU/RAM mismatch above which a flavor is flagged as oversized
const OVERSIZE_RATIO: f64 = 0.5;
/// Baseline RAM (GB) from which denser flavors are worth a look
const MEMORY_INTENSIVE_RAM_GB: u32 = 32;

fn rec(
    id: &str,
    kind: RecommendationKind,
    priority: Priority,
    title: &str,
    message: impl Into<String>,
    action: &str,
) -> RecommendationFinding {
    RecommendationFinding {
        id: id.to_string(),
        kind,
        priority,
        title: title.to_string(),
        message: message.into(),
        action: action.to_string(),
    }
}

/// Produce the deduplicated, priority-ordered recommendations for a configuration
pub fn generate_recommendations(
    baseline: &BaselineProfile,
    flavor: &NodeFlavor,
    zones: ZoneCount,
    _costs: &CostBreakdown,
    score: &CostScore,
    risks: &[RiskFinding],
) -> Vec<RecommendationFinding> {
    let mut recs = score_recommendations(score);
    recs.extend(configuration_recommendations(baseline));
    recs.extend(flavor_recommendations(baseline, flavor));
    recs.extend(zone_recommendations(zones));
    recs.extend(risk_recommendations(risks));
    recs.extend(best_practices(baseline));

    let mut seen = HashSet::new();
    recs.retain(|r| seen.insert(r.id.clone()));
    recs.sort_by_key(|r| r.priority);
    recs
}

fn score_recommendations(score: &CostScore) -> Vec<RecommendationFinding> {
    let finding = match score.level {
        ScoreLevel::Green => rec(
            "cost-optimal",
            RecommendationKind::Success,
            Priority::Low,
            "Cost is Optimal",
            "Your configuration is cost-effective and within the optimal range.",
            "No immediate action required",
        ),
        ScoreLevel::Amber => rec(
            "cost-moderate",
            RecommendationKind::Optimization,
            Priority::Medium,
            "Cost Optimization Opportunity",
            "Your configuration has moderate costs. Review for potential optimizations.",
            "Consider smaller flavors or reducing zones if high availability is not critical",
        ),
        ScoreLevel::Red => rec(
            "cost-high",
            RecommendationKind::Critical,
            Priority::High,
            "High Cost Detected",
            "Your configuration has high costs that may impact budget.",
            "Review flavor selection, number of zones, and worker count for optimization",
        ),
    };
    vec![finding]
}

/// Exactly Core plus IoT and nothing else
fn is_iot_only(baseline: &BaselineProfile) -> bool {
    baseline.components.len() == 2 && baseline.has_component("Core") && baseline.has_component("IoT")
}

fn configuration_recommendations(baseline: &BaselineProfile) -> Vec<RecommendationFinding> {
    let mut recs = Vec::new();

    if is_iot_only(baseline) {
        recs.push(rec(
            "iot-optimization",
            RecommendationKind::Optimization,
            Priority::Medium,
            "IoT Configuration Optimization",
            "IoT-focused deployments can often use smaller instance types.",
            "Consider bx2.8x32 or bx3d.8x40 for cost savings if performance is adequate",
        ));
    }

    if baseline.workers >= LARGE_DEPLOYMENT_WORKERS {
        recs.push(rec(
            "large-deployment",
            RecommendationKind::Scalability,
            Priority::High,
            "Large Deployment Detected",
            "Large deployments require careful planning for scalability and management.",
            "Plan for auto-scaling, load balancing, and monitoring infrastructure",
        ));
    }

    if baseline.has_component("Predict") && baseline.has_component("Monitor") {
        recs.push(rec(
            "predictive-maintenance",
            RecommendationKind::BestPractice,
            Priority::Medium,
            "Predictive Maintenance Suite",
            "Full predictive maintenance requires robust infrastructure.",
            "Ensure adequate resources for AI/ML workloads and data processing",
        ));
    }

    if baseline.has_component("MVI") {
        recs.push(rec(
            "mvi-resources",
            RecommendationKind::Performance,
            Priority::Medium,
            "Visual Inspection Workload",
            "MVI requires sufficient resources for image processing.",
            "Consider flavors with higher memory for optimal performance",
        ));
    }

    recs
}

/// |offered - required| / required, or 0 when nothing is required
fn mismatch_ratio(offered: u32, required: u32) -> f64 {
    if required == 0 {
        return 0.0;
    }
    (f64::from(offered) - f64::from(required)).abs() / f64::from(required)
}

fn flavor_recommendations(baseline: &BaselineProfile, flavor: &NodeFlavor) -> Vec<RecommendationFinding> {
    let mut recs = Vec::new();

    if mismatch_ratio(flavor.vcpu, baseline.vcpu) > OVERSIZE_RATIO
        || mismatch_ratio(flavor.ram_gb, baseline.ram_gb) > OVERSIZE_RATIO
    {
        recs.push(rec(
            "flavor-oversized",
            RecommendationKind::Cost,
            Priority::Medium,
            "Flavor May Be Oversized",
            "Selected flavor has significantly more resources than baseline requirements.",
            "Review flavor recommendations for better cost-performance match",
        ));
    }

    if baseline.ram_gb >= MEMORY_INTENSIVE_RAM_GB && flavor.series.is_lower_density() {
        recs.push(rec(
            "consider-bx3d",
            RecommendationKind::Optimization,
            Priority::Low,
            "Consider Memory-Dense Flavors",
            "For memory-intensive workloads, bx3d series offers better memory density.",
            "Evaluate bx3d series flavors for potential cost savings",
        ));
    }

    recs
}

fn zone_recommendations(zones: ZoneCount) -> Vec<RecommendationFinding> {
    let finding = match zones {
        ZoneCount::One => rec(
            "single-zone-warning",
            RecommendationKind::Availability,
            Priority::High,
            "Single Zone Deployment",
            "Single zone deployments lack zone-level redundancy.",
            "Consider multi-zone (2+ zones) for production workloads to ensure high availability",
        ),
        ZoneCount::Two => rec(
            "multi-zone-good",
            RecommendationKind::Success,
            Priority::Low,
            "Multi-Zone Deployment",
            "Two-zone deployment provides good balance of availability and cost.",
            "Recommended configuration for production workloads",
        ),
        ZoneCount::Three => rec(
            "three-zone-premium",
            RecommendationKind::Info,
            Priority::Low,
            "Maximum Redundancy",
            "Three-zone deployment provides maximum availability.",
            "Ensure the additional cost is justified by availability requirements",
        ),
    };
    vec![finding]
}

fn risk_recommendations(risks: &[RiskFinding]) -> Vec<RecommendationFinding> {
    let high = risks.iter().filter(|r| r.severity == Severity::High).count();
    if high == 0 {
        return Vec::new();
    }

    vec![rec(
        "address-high-risks",
        RecommendationKind::Critical,
        Priority::High,
        "Critical Issues Detected",
        format!("{} high-severity risk(s) detected.", high),
        "Address all high-severity risks before deployment",
    )]
}

fn best_practices(baseline: &BaselineProfile) -> Vec<RecommendationFinding> {
    let mut recs = vec![
        rec(
            "monitoring",
            RecommendationKind::BestPractice,
            Priority::Medium,
            "Implement Monitoring",
            "Set up comprehensive monitoring for your MAS deployment.",
            "Configure alerts for resource utilization, performance metrics, and cost thresholds",
        ),
        rec(
            "backup-strategy",
            RecommendationKind::BestPractice,
            Priority::Medium,
            "Backup and Disaster Recovery",
            "Ensure proper backup and disaster recovery procedures.",
            "Implement regular backups and test recovery procedures",
        ),
    ];

    if baseline.workers >= CAPACITY_PLANNING_WORKERS {
        recs.push(rec(
            "capacity-planning",
            RecommendationKind::BestPractice,
            Priority::Low,
            "Capacity Planning",
            "Plan for future growth and scaling requirements.",
            "Review resource utilization regularly and adjust as needed",
        ));
    }

    recs
}

/// Counts per priority and per headline type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub critical: usize,
    pub optimization: usize,
    pub best_practice: usize,
    pub success: usize,
}

pub fn recommendation_summary(recs: &[RecommendationFinding]) -> RecommendationSummary {
    let by_priority = |p: Priority| recs.iter().filter(|r| r.priority == p).count();
    let by_kind = |k: RecommendationKind| recs.iter().filter(|r| r.kind == k).count();

    RecommendationSummary {
        total: recs.len(),
        high: by_priority(Priority::High),
        medium: by_priority(Priority::Medium),
        low: by_priority(Priority::Low),
        critical: by_kind(RecommendationKind::Critical),
        optimization: by_kind(RecommendationKind::Optimization),
        best_practice: by_kind(RecommendationKind::BestPractice),
        success: by_kind(RecommendationKind::Success),
    }
}

pub fn filter_by_kind(recs: &[RecommendationFinding], kind: RecommendationKind) -> Vec<RecommendationFinding> {
    recs.iter().filter(|r| r.kind == kind).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::costing::{compute_costs, score_cost};
    use crate::risk::assess_risks;

    fn generate(baseline: &BaselineProfile, flavor: &NodeFlavor, zones: ZoneCount) -> Vec<RecommendationFinding> {
        let costs = compute_costs(baseline, flavor, zones);
        let score = score_cost(costs.total.monthly, zones);
        let risks = assess_risks(baseline, flavor, zones, &costs);
        generate_recommendations(baseline, flavor, zones, &costs, &score, &risks)
    }

    fn generate_from_catalog(baseline_id: &str, flavor_id: &str, zones: ZoneCount) -> Vec<RecommendationFinding> {
        let catalog = Catalog::embedded().unwrap();
        let baseline = catalog.baselines.require(baseline_id).unwrap();
        let flavor = catalog.flavors.require(flavor_id).unwrap();
        generate(baseline, flavor, zones)
    }

    fn ids(recs: &[RecommendationFinding]) -> Vec<&str> {
        recs.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_standard_two_zone_configuration() {
        // $3,241.20/month on two zones scores GREEN
        let recs = generate_from_catalog("config-1", "bx2-16x32", ZoneCount::Two);

        assert_eq!(
            ids(&recs),
            vec![
                "monitoring",
                "backup-strategy",
                "cost-optimal",
                "consider-bx3d",
                "multi-zone-good",
                "capacity-planning",
            ]
        );
    }

    #[test]
    fn test_large_single_zone_configuration() {
        let recs = generate_from_catalog("config-3", "bx2-8x16", ZoneCount::One);
        let high: Vec<&str> = recs
            .iter()
            .filter(|r| r.priority == Priority::High)
            .map(|r| r.id.as_str())
            .collect();

        assert_eq!(
            high,
            vec!["large-deployment", "single-zone-warning", "address-high-risks"]
        );
        let critical = recs.iter().find(|r| r.id == "address-high-risks").unwrap();
        assert_eq!(critical.message, "3 high-severity risk(s) detected.");
        assert!(ids(&recs).contains(&"predictive-maintenance"));
        // 8 vCPU against 16 required is a 50% mismatch, RAM 16 vs 32 likewise
        assert!(!ids(&recs).contains(&"flavor-oversized"));
    }

    #[test]
    fn test_iot_only_baseline() {
        let recs = generate_from_catalog("config-4", "bx2-8x16", ZoneCount::Three);
        assert!(ids(&recs).contains(&"iot-optimization"));
        assert!(ids(&recs).contains(&"three-zone-premium"));
        assert!(!ids(&recs).contains(&"consider-bx3d"));

        // IoT inside a larger bundle does not count
        let suite = generate_from_catalog("config-3", "bx2-16x32", ZoneCount::Three);
        assert!(!ids(&suite).contains(&"iot-optimization"));
    }

    #[test]
    fn test_mvi_and_oversized_flavor() {
        let recs = generate_from_catalog("config-5", "bx3d-32x160", ZoneCount::Two);
        assert!(ids(&recs).contains(&"mvi-resources"));
        assert!(ids(&recs).contains(&"flavor-oversized"));
        assert!(!ids(&recs).contains(&"consider-bx3d"));
    }

    #[test]
    fn test_red_score_is_high_priority() {
        let recs = generate_from_catalog("config-3", "bx3d-176x1760", ZoneCount::Three);
        let cost = recs.iter().find(|r| r.id == "cost-high").unwrap();
        assert_eq!(cost.kind, RecommendationKind::Critical);
        assert_eq!(cost.priority, Priority::High);
    }

    #[test]
    fn test_no_duplicate_ids_across_catalog() {
        let catalog = Catalog::embedded().unwrap();
        for baseline in catalog.baselines.all() {
            for flavor in catalog.flavors.all() {
                for zones in ZoneCount::ALL {
                    let recs = generate(baseline, flavor, zones);
                    let unique: HashSet<&str> = recs.iter().map(|r| r.id.as_str()).collect();
                    assert_eq!(unique.len(), recs.len());

                    let priorities: Vec<Priority> = recs.iter().map(|r| r.priority).collect();
                    let mut sorted = priorities.clone();
                    sorted.sort();
                    assert_eq!(priorities, sorted);
                }
            }
        }
    }

    #[test]
    fn test_summary_and_filter() {
        let recs = generate_from_catalog("config-1", "bx2-16x32", ZoneCount::Two);
        let summary = recommendation_summary(&recs);

        assert_eq!(summary.total, 6);
        assert_eq!(summary.high, 0);
        assert_eq!(summary.medium, 2);
        assert_eq!(summary.low, 4);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.best_practice, 3);
        assert_eq!(filter_by_kind(&recs, RecommendationKind::Optimization).len(), 1);
    }
}
