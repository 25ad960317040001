//! Cloud-mode cluster analysis
//!
//! Live clusters are costed from their worker lists: the flavor name is
//! normalized, priced against the cloud price table, scored on total hourly
//! cost and given a short list of recommendation strings. This path has its
//! own thresholds and rules and does not reuse the scenario-mode scorer.

mod analyzer;
mod normalize;
mod pricing;

#[cfg(test)]
mod tests;

pub use analyzer::{
    analyze_cluster, uptime_label, AnalyzerConfig, ClusterAggregate, ClusterAnalysis,
    ClusterAnalyzer, FailedCluster, ScoreCounts, OPTIMAL_RECOMMENDATION,
};
pub use normalize::{normalize_flavor, parse_dimensions, parse_disk, UNKNOWN_FLAVOR};
pub use pricing::{score_cluster_hourly, ClusterScore, HourlyThresholds, PriceTable};
