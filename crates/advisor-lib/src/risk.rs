//! Risk assessment for a proposed configuration
//!
//! Four independent rule groups (configuration, zones, cost, provisioning)
//! each contribute findings. The combined list is stably sorted by severity
//! so findings keep generation order within a tier.

use crate::costing::CostBreakdown;
use crate::models::{BaselineProfile, NodeFlavor, RiskCategory, RiskFinding, Severity, ZoneCount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workers at or above which a single zone is a production risk
const SINGLE_ZONE_PRODUCTION_WORKERS: u32 = 3;
/// Workers at or above which a single zone is a severe risk
const LARGE_DEPLOYMENT_WORKERS: u32 = 6;
/// Over-provisioning percentage that triggers an optimization finding
const OVERHEAD_PERCENT_LIMIT: f64 = 100.0;
/// Minimum network class (Gbps) for large deployments
const MIN_LARGE_DEPLOYMENT_GBPS: u32 = 16;

/// Monthly cost thresholds for cost risks: (high, very high)
fn cost_risk_thresholds(zones: ZoneCount) -> (f64, f64) {
    match zones {
        ZoneCount::One => (10_000.0, 20_000.0),
        ZoneCount::Two => (20_000.0, 40_000.0),
        ZoneCount::Three => (30_000.0, 60_000.0),
    }
}

fn finding(
    id: &str,
    severity: Severity,
    category: RiskCategory,
    title: &str,
    message: String,
    impact: &str,
    recommendation: String,
) -> RiskFinding {
    RiskFinding {
        id: id.to_string(),
        severity,
        category,
        title: title.to_string(),
        message,
        impact: impact.to_string(),
        recommendation,
    }
}

/// Assess every rule group and return findings ordered high, medium, low
pub fn assess_risks(
    baseline: &BaselineProfile,
    flavor: &NodeFlavor,
    zones: ZoneCount,
    costs: &CostBreakdown,
) -> Vec<RiskFinding> {
    let mut risks = configuration_risks(baseline, flavor);
    risks.extend(zone_risks(baseline, zones));
    risks.extend(cost_risks(zones, costs));
    risks.extend(provisioning_risks(baseline, flavor));

    risks.sort_by_key(|r| r.severity);
    risks
}

fn configuration_risks(baseline: &BaselineProfile, flavor: &NodeFlavor) -> Vec<RiskFinding> {
    let mut risks = Vec::new();

    if flavor.vcpu < baseline.vcpu {
        risks.push(finding(
            "insufficient-vcpu",
            Severity::High,
            RiskCategory::Configuration,
            "Insufficient vCPU",
            format!(
                "Flavor vCPU ({}) is below baseline requirement ({})",
                flavor.vcpu, baseline.vcpu
            ),
            "Performance degradation and potential application failures",
            format!("Select a flavor with at least {} vCPU", baseline.vcpu),
        ));
    }

    if flavor.ram_gb < baseline.ram_gb {
        risks.push(finding(
            "insufficient-ram",
            Severity::High,
            RiskCategory::Configuration,
            "Insufficient RAM",
            format!(
                "Flavor RAM ({}GB) is below baseline requirement ({}GB)",
                flavor.ram_gb, baseline.ram_gb
            ),
            "Memory pressure, OOM errors, and application instability",
            format!("Select a flavor with at least {}GB RAM", baseline.ram_gb),
        ));
    }

    if flavor.storage_gb < baseline.disk_gb {
        risks.push(finding(
            "insufficient-disk",
            Severity::Medium,
            RiskCategory::Configuration,
            "Insufficient Disk Space",
            format!(
                "Flavor storage ({}GB) is below baseline requirement ({}GB)",
                flavor.storage_gb, baseline.disk_gb
            ),
            "Potential storage capacity issues",
            "Consider additional storage volumes or larger flavor".to_string(),
        ));
    }

    risks
}

fn zone_risks(baseline: &BaselineProfile, zones: ZoneCount) -> Vec<RiskFinding> {
    let mut risks = Vec::new();
    if zones != ZoneCount::One {
        return risks;
    }

    if baseline.workers >= SINGLE_ZONE_PRODUCTION_WORKERS {
        risks.push(finding(
            "single-zone-production",
            Severity::Medium,
            RiskCategory::Availability,
            "Single Zone Deployment",
            "Production workload deployed in single zone".to_string(),
            "No zone-level redundancy; zone failure affects entire deployment",
            "Consider multi-zone deployment (2+ zones) for high availability".to_string(),
        ));
    }

    if baseline.workers >= LARGE_DEPLOYMENT_WORKERS {
        risks.push(finding(
            "large-single-zone",
            Severity::High,
            RiskCategory::Availability,
            "Large Single Zone Deployment",
            "Large deployment without zone redundancy".to_string(),
            "High risk of complete service disruption on zone failure",
            "Strongly recommend multi-zone deployment for this scale".to_string(),
        ));
    }

    risks
}

fn cost_risks(zones: ZoneCount, costs: &CostBreakdown) -> Vec<RiskFinding> {
    let monthly = costs.total.monthly;
    let (high, very_high) = cost_risk_thresholds(zones);

    if monthly > very_high {
        vec![finding(
            "very-high-cost",
            Severity::High,
            RiskCategory::Cost,
            "Very High Monthly Cost",
            format!(
                "Monthly cost (${:.2}) significantly exceeds typical range",
                monthly
            ),
            "Budget overrun and potential cost optimization opportunities missed",
            "Review configuration for right-sizing opportunities".to_string(),
        )]
    } else if monthly > high {
        vec![finding(
            "high-cost",
            Severity::Medium,
            RiskCategory::Cost,
            "High Monthly Cost",
            format!("Monthly cost (${:.2}) is above typical range", monthly),
            "Higher than expected operational costs",
            "Consider cost optimization strategies".to_string(),
        )]
    } else {
        Vec::new()
    }
}

/// Percentage by which `offered` exceeds `required`; `None` when nothing is required
fn overhead_percent(offered: u32, required: u32) -> Option<f64> {
    (required > 0).then(|| (f64::from(offered) - f64::from(required)) / f64::from(required) * 100.0)
}

fn provisioning_risks(baseline: &BaselineProfile, flavor: &NodeFlavor) -> Vec<RiskFinding> {
    let mut risks = Vec::new();

    if let Some(overhead) = overhead_percent(flavor.vcpu, baseline.vcpu) {
        if overhead > OVERHEAD_PERCENT_LIMIT {
            risks.push(finding(
                "vcpu-over-provisioned",
                Severity::Low,
                RiskCategory::Optimization,
                "vCPU Over-Provisioned",
                format!("Flavor has {}% more vCPU than required", overhead.round()),
                "Paying for unused compute capacity",
                "Consider a smaller flavor to optimize costs".to_string(),
            ));
        }
    }

    if let Some(overhead) = overhead_percent(flavor.ram_gb, baseline.ram_gb) {
        if overhead > OVERHEAD_PERCENT_LIMIT {
            risks.push(finding(
                "ram-over-provisioned",
                Severity::Low,
                RiskCategory::Optimization,
                "RAM Over-Provisioned",
                format!("Flavor has {}% more RAM than required", overhead.round()),
                "Paying for unused memory capacity",
                "Consider a smaller flavor to optimize costs".to_string(),
            ));
        }
    }

    let slow_network = flavor
        .network_gbps()
        .is_some_and(|gbps| gbps < MIN_LARGE_DEPLOYMENT_GBPS);
    if baseline.workers >= LARGE_DEPLOYMENT_WORKERS && slow_network {
        risks.push(finding(
            "network-bandwidth",
            Severity::Low,
            RiskCategory::Performance,
            "Network Bandwidth Consideration",
            format!("Large deployment with {} network speed", flavor.network),
            "Potential network bottlenecks under high load",
            "Monitor network utilization and consider higher bandwidth flavors if needed"
                .to_string(),
        ));
    }

    risks
}

/// Worst severity present in a risk list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallRisk {
    High,
    Medium,
    Low,
    None,
}

impl OverallRisk {
    pub fn message(&self) -> &'static str {
        match self {
            OverallRisk::High => "Critical issues detected - immediate action required",
            OverallRisk::Medium => "Some concerns identified - review recommended",
            OverallRisk::Low => "Minor optimization opportunities available",
            OverallRisk::None => "No risks detected - configuration looks good",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub categories: BTreeMap<RiskCategory, usize>,
    pub overall_risk: OverallRisk,
    pub overall_message: String,
}

pub fn risk_summary(risks: &[RiskFinding]) -> RiskSummary {
    let count = |severity: Severity| risks.iter().filter(|r| r.severity == severity).count();
    let high = count(Severity::High);
    let medium = count(Severity::Medium);
    let low = count(Severity::Low);

    let mut categories = BTreeMap::new();
    for risk in risks {
        *categories.entry(risk.category).or_insert(0) += 1;
    }

    let overall_risk = if high > 0 {
        OverallRisk::High
    } else if medium > 0 {
        OverallRisk::Medium
    } else if low > 0 {
        OverallRisk::Low
    } else {
        OverallRisk::None
    };

    RiskSummary {
        total: risks.len(),
        high,
        medium,
        low,
        categories,
        overall_risk,
        overall_message: overall_risk.message().to_string(),
    }
}

pub fn filter_by_severity(risks: &[RiskFinding], severity: Severity) -> Vec<RiskFinding> {
    risks.iter().filter(|r| r.severity == severity).cloned().collect()
}

pub fn filter_by_category(risks: &[RiskFinding], category: RiskCategory) -> Vec<RiskFinding> {
    risks.iter().filter(|r| r.category == category).cloned().collect()
}
