//! End-to-end advisory pipeline
//!
//! Runs cost calculation, scoring, risk assessment and recommendation
//! generation in order for a single (baseline, flavor, zones) selection.

use crate::costing::{compute_costs, score_cost, CostBreakdown, CostScore};
use crate::models::{BaselineProfile, NodeFlavor, RecommendationFinding, RiskFinding, ZoneCount};
use crate::recommendations::generate_recommendations;
use crate::risk::assess_risks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full result bundle for one selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResult {
    pub costs: CostBreakdown,
    pub score: CostScore,
    pub risks: Vec<RiskFinding>,
    pub recommendations: Vec<RecommendationFinding>,
    pub computed_at: DateTime<Utc>,
}

pub fn advise(baseline: &BaselineProfile, flavor: &NodeFlavor, zones: ZoneCount) -> AdvisoryResult {
    let costs = compute_costs(baseline, flavor, zones);
    let score = score_cost(costs.total.monthly, zones);
    let risks = assess_risks(baseline, flavor, zones, &costs);
    let recommendations = generate_recommendations(baseline, flavor, zones, &costs, &score, &risks);

    AdvisoryResult {
        costs,
        score,
        risks,
        recommendations,
        computed_at: Utc::now(),
    }
}
