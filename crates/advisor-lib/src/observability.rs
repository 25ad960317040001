//! Observability for the sizing advisor
//!
//! Provides:
//! - Prometheus metrics (estimates, cluster analysis outcomes, scenario store size, reports)
//! - Structured event logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for cluster analysis latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

struct AdvisorMetricsInner {
    estimates_computed: IntCounter,
    clusters_analyzed: IntCounter,
    cluster_analysis_failures: IntCounter,
    unpriced_clusters: IntCounter,
    scenarios_stored: IntGauge,
    scenarios_evicted: IntCounter,
    reports_generated: IntCounter,
    cluster_analysis_latency_seconds: Histogram,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            estimates_computed: register_int_counter!(
                "sizing_advisor_estimates_computed_total",
                "Total number of cost estimates computed"
            )
            .expect("Failed to register estimates_computed"),

            clusters_analyzed: register_int_counter!(
                "sizing_advisor_clusters_analyzed_total",
                "Total number of clusters analyzed successfully"
            )
            .expect("Failed to register clusters_analyzed"),

            cluster_analysis_failures: register_int_counter!(
                "sizing_advisor_cluster_analysis_failures_total",
                "Total number of clusters excluded because their details could not be fetched"
            )
            .expect("Failed to register cluster_analysis_failures"),

            unpriced_clusters: register_int_counter!(
                "sizing_advisor_unpriced_clusters_total",
                "Total number of analyzed clusters whose flavor has no price"
            )
            .expect("Failed to register unpriced_clusters"),

            scenarios_stored: register_int_gauge!(
                "sizing_advisor_scenarios_stored",
                "Number of scenarios currently held by the scenario store"
            )
            .expect("Failed to register scenarios_stored"),

            scenarios_evicted: register_int_counter!(
                "sizing_advisor_scenarios_evicted_total",
                "Total number of scenarios evicted to respect the retention bound"
            )
            .expect("Failed to register scenarios_evicted"),

            reports_generated: register_int_counter!(
                "sizing_advisor_reports_generated_total",
                "Total number of cluster analysis reports written"
            )
            .expect("Failed to register reports_generated"),

            cluster_analysis_latency_seconds: register_histogram!(
                "sizing_advisor_cluster_analysis_latency_seconds",
                "Time spent analyzing all clusters of the account",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register cluster_analysis_latency_seconds"),
        }
    }
}

/// Advisor metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance. Clones share the
/// same underlying metrics.
#[derive(Debug, Clone)]
pub struct AdvisorMetrics {
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new)
    }

    pub fn inc_estimates_computed(&self) {
        self.inner().estimates_computed.inc();
    }

    pub fn inc_clusters_analyzed(&self) {
        self.inner().clusters_analyzed.inc();
    }

    pub fn inc_cluster_analysis_failures(&self) {
        self.inner().cluster_analysis_failures.inc();
    }

    pub fn inc_unpriced_clusters(&self) {
        self.inner().unpriced_clusters.inc();
    }

    pub fn set_scenarios_stored(&self, count: i64) {
        self.inner().scenarios_stored.set(count);
    }

    pub fn inc_scenarios_evicted(&self, count: u64) {
        self.inner().scenarios_evicted.inc_by(count);
    }

    pub fn inc_reports_generated(&self) {
        self.inner().reports_generated.inc();
    }

    /// Record how long an account-wide analysis took
    pub fn observe_cluster_analysis_latency(&self, duration_secs: f64) {
        self.inner()
            .cluster_analysis_latency_seconds
            .observe(duration_secs);
    }
}

/// Structured logger for advisor events
///
/// Every record carries an `event` field so log pipelines can filter on it.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, catalog_version: &str, cloud_configured: bool) {
        info!(
            event = "advisor_started",
            instance = %self.instance,
            advisor_version = %version,
            catalog_version = %catalog_version,
            cloud_configured = cloud_configured,
            "Sizing advisor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "advisor_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Sizing advisor shutting down"
        );
    }

    pub fn log_estimate(
        &self,
        baseline_id: &str,
        flavor: &str,
        zones: u8,
        monthly_cost: f64,
        score: &str,
        risks: usize,
    ) {
        info!(
            event = "estimate_computed",
            instance = %self.instance,
            baseline_id = %baseline_id,
            flavor = %flavor,
            zones = zones,
            monthly_cost = monthly_cost,
            score = %score,
            risks = risks,
            "Computed cost estimate"
        );
    }

    pub fn log_cluster_analyzed(&self, cluster_id: &str, flavor: &str, workers: u32, hourly: f64, score: &str) {
        info!(
            event = "cluster_analyzed",
            instance = %self.instance,
            cluster_id = %cluster_id,
            flavor = %flavor,
            workers = workers,
            hourly_cost = hourly,
            score = %score,
            "Analyzed cluster"
        );
    }

    pub fn log_cluster_failed(&self, cluster_id: &str, error: &str) {
        warn!(
            event = "cluster_analysis_failed",
            instance = %self.instance,
            cluster_id = %cluster_id,
            error = %error,
            "Cluster excluded from analysis"
        );
    }

    /// Flavor with no entry in the price table; its cost reads as zero
    pub fn log_unpriced_flavor(&self, cluster_id: &str, raw_flavor: &str, normalized_flavor: &str) {
        warn!(
            event = "unpriced_flavor",
            instance = %self.instance,
            cluster_id = %cluster_id,
            raw_flavor = %raw_flavor,
            normalized_flavor = %normalized_flavor,
            "No price found for worker flavor, cost reported as zero"
        );
    }

    pub fn log_scenario_saved(&self, scenario_id: &str, name: &str, total: usize) {
        info!(
            event = "scenario_saved",
            instance = %self.instance,
            scenario_id = %scenario_id,
            name = %name,
            total = total,
            "Scenario saved"
        );
    }

    pub fn log_scenarios_evicted(&self, evicted: usize, remaining: usize) {
        info!(
            event = "scenarios_evicted",
            instance = %self.instance,
            evicted = evicted,
            remaining = remaining,
            "Evicted oldest scenarios"
        );
    }

    pub fn log_store_write_failed(&self, error: &str, retrying: bool) {
        warn!(
            event = "scenario_store_write_failed",
            instance = %self.instance,
            error = %error,
            retrying = retrying,
            "Scenario store write failed"
        );
    }

    pub fn log_report_generated(&self, path: &str, clusters: usize) {
        info!(
            event = "report_generated",
            instance = %self.instance,
            path = %path,
            clusters = clusters,
            "Cluster analysis report written"
        );
    }
}
