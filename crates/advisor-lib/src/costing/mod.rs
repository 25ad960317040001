//! Scenario-mode costing: cost breakdowns and the monthly cost score

mod calculator;
mod format;
mod scorer;

pub use calculator::{
    calculate_savings, compare_scenarios, compute_costs, cost_per_resource, estimate_cost_periods,
    ComparedScenario, CostBreakdown, CostComparison, CostPeriods, CostRates, ResourceUnitCosts,
    Savings, HOURS_PER_MONTH, HOURS_PER_YEAR,
};
pub use format::{format_currency, format_large_number};
pub use scorer::{score_cost, CostScore, ScoreLevel, ScoreThresholds};
