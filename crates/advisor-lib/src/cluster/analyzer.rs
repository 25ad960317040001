//! Per-cluster analysis and the account-wide aggregate

use super::normalize::{normalize_flavor, parse_dimensions, parse_disk, UNKNOWN_FLAVOR};
use super::pricing::{score_cluster_hourly, ClusterScore, PriceTable};
use crate::cloud::{ClusterDetails, ClusterSource, ClusterSummary};
use crate::costing::{CostRates, HOURS_PER_MONTH};
use crate::error::Result;
use crate::observability::{AdvisorMetrics, StructuredLogger};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Hourly cost above which a cluster is flagged as expensive
const HIGH_HOURLY_COST: f64 = 5.0;
/// Worker count above which a cluster is flagged for review
const HIGH_WORKER_COUNT: u32 = 9;
/// Dense flavor with a cheaper balanced equivalent
const DOWNSIZE_FROM: &str = "bx3d.16x64";
const DOWNSIZE_TO: &str = "bx2.16x32";

pub const OPTIMAL_RECOMMENDATION: &str = "✅ Configuration looks optimal";

/// Cost and score for one live cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAnalysis {
    pub id: String,
    pub name: String,
    pub state: String,
    /// `YYYY-MM-DD`, absent when the provider gave no usable timestamp
    pub created_date: Option<String>,
    pub uptime_days: i64,
    pub uptime: String,
    pub workers: u32,
    pub flavor: String,
    pub normalized_flavor: String,
    pub cpu: u32,
    /// GB
    pub memory: u32,
    /// GB
    pub disk: u32,
    pub zones: usize,
    pub zone_list: Vec<String>,
    pub location: String,
    pub resource_group: String,
    pub price_per_worker: f64,
    pub priced: bool,
    /// Totals for all workers; zone replication is already in the worker list
    pub costs: CostRates,
    pub score: ClusterScore,
    pub recommendations: Vec<String>,
    /// Monthly rate × uptime months, an approximation
    pub total_cost_to_date: f64,
}

/// Number of analyzed clusters per score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCounts {
    pub green: usize,
    pub amber: usize,
    pub red: usize,
    pub unpriced: usize,
}

impl ScoreCounts {
    pub fn record(&mut self, score: ClusterScore) {
        match score {
            ClusterScore::Green => self.green += 1,
            ClusterScore::Amber => self.amber += 1,
            ClusterScore::Red => self.red += 1,
            ClusterScore::Unpriced => self.unpriced += 1,
        }
    }

    pub fn get(&self, score: ClusterScore) -> usize {
        match score {
            ClusterScore::Green => self.green,
            ClusterScore::Amber => self.amber,
            ClusterScore::Red => self.red,
            ClusterScore::Unpriced => self.unpriced,
        }
    }
}

/// Cluster left out of an aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCluster {
    pub id: String,
    pub name: String,
    pub error: String,
}

/// Account-wide totals over successfully analyzed clusters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAggregate {
    pub total_clusters: usize,
    pub total_workers: u64,
    pub total_monthly_cost: f64,
    pub total_yearly_cost: f64,
    pub total_cost_to_date: f64,
    pub score_counts: ScoreCounts,
    pub clusters: Vec<ClusterAnalysis>,
    #[serde(default)]
    pub failed: Vec<FailedCluster>,
    pub generated_at: DateTime<Utc>,
}

impl ClusterAggregate {
    pub fn from_analyses(
        clusters: Vec<ClusterAnalysis>,
        failed: Vec<FailedCluster>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut score_counts = ScoreCounts::default();
        for cluster in &clusters {
            score_counts.record(cluster.score);
        }

        Self {
            total_clusters: clusters.len(),
            total_workers: clusters.iter().map(|c| u64::from(c.workers)).sum(),
            total_monthly_cost: clusters.iter().map(|c| c.costs.monthly).sum(),
            total_yearly_cost: clusters.iter().map(|c| c.costs.yearly).sum(),
            total_cost_to_date: clusters.iter().map(|c| c.total_cost_to_date).sum(),
            score_counts,
            clusters,
            failed,
            generated_at,
        }
    }
}

/// Analyze one cluster against the price table as of `now`
pub fn analyze_cluster(details: &ClusterDetails, prices: &PriceTable, now: DateTime<Utc>) -> ClusterAnalysis {
    let cluster = &details.cluster;
    let first = details.workers.first();

    let workers = if details.workers.is_empty() {
        cluster.worker_count.unwrap_or(0)
    } else {
        u32::try_from(details.workers.len()).unwrap_or(u32::MAX)
    };

    let raw_flavor = first
        .and_then(|w| w.flavor_name())
        .filter(|f| !f.is_empty())
        .unwrap_or(UNKNOWN_FLAVOR)
        .to_string();

    let mut zone_list: Vec<String> = Vec::new();
    for worker in &details.workers {
        let zone = worker.zone_name().unwrap_or("unknown").to_string();
        if !zone_list.contains(&zone) {
            zone_list.push(zone);
        }
    }

    let mut cpu = first.and_then(|w| w.cpu).filter(|c| *c > 0).unwrap_or(0);
    let mut memory = first.and_then(|w| w.memory).filter(|m| *m > 0).unwrap_or(0);
    if cpu == 0 && raw_flavor != UNKNOWN_FLAVOR {
        if let Some((c, m)) = parse_dimensions(&raw_flavor) {
            cpu = c;
            memory = m;
        }
    }
    let disk = first
        .and_then(|w| w.disk_gb())
        .filter(|d| *d > 0)
        .or_else(|| parse_disk(&raw_flavor))
        .unwrap_or(0);

    let normalized_flavor = normalize_flavor(&raw_flavor);
    let price = prices.lookup(&raw_flavor, &normalized_flavor);
    let priced = price.is_some();
    let price_per_worker = price.unwrap_or(0.0);
    let costs = CostRates::from_hourly(price_per_worker * f64::from(workers));

    let created = cluster.created_at().and_then(parse_timestamp);
    let uptime_days = created
        .map(|c| (now - c).num_days().max(0))
        .unwrap_or(0);

    let score = score_cluster_hourly(costs.hourly, zone_list.len(), priced);
    let recommendations = cluster_recommendations(&RecommendationInput {
        name: &cluster.name,
        workers,
        flavor: &normalized_flavor,
        zones: zone_list.len(),
        total_hourly: costs.hourly,
        priced,
        prices,
    });

    ClusterAnalysis {
        id: cluster.id.clone(),
        name: cluster.name.clone(),
        state: cluster.state.clone().unwrap_or_else(|| "unknown".to_string()),
        created_date: created.map(|c| c.format("%Y-%m-%d").to_string()),
        uptime_days,
        uptime: uptime_label(uptime_days),
        workers,
        flavor: raw_flavor,
        normalized_flavor,
        cpu,
        memory,
        disk,
        zones: zone_list.len(),
        zone_list,
        location: cluster
            .location_or_region()
            .unwrap_or("unknown")
            .to_string(),
        resource_group: cluster
            .resource_group_name
            .clone()
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| "default".to_string()),
        price_per_worker,
        priced,
        costs,
        score,
        recommendations,
        total_cost_to_date: costs.monthly * (uptime_days as f64 / 30.0),
    }
}

/// `"N days"` under a month, otherwise whole 30-day months
pub fn uptime_label(days: i64) -> String {
    if days < 30 {
        format!("{} days", days)
    } else {
        format!("{} months", days / 30)
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    // The provider sometimes drops the colon from the offset
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| Utc.from_utc_datetime(&d))
}

struct RecommendationInput<'a> {
    name: &'a str,
    workers: u32,
    flavor: &'a str,
    zones: usize,
    total_hourly: f64,
    priced: bool,
    prices: &'a PriceTable,
}

/// Rule set for live clusters; never empty
fn cluster_recommendations(input: &RecommendationInput<'_>) -> Vec<String> {
    let mut recs = Vec::new();

    if !input.priced {
        recs.push(format!(
            "❓ No price found for flavor {} - Costs are shown as $0, verify pricing data",
            input.flavor
        ));
    }

    if input.total_hourly > HIGH_HOURLY_COST {
        recs.push("⚠️ High cost detected - Consider downsizing or using fewer zones".to_string());
    }

    if input.zones == 3 && (input.name.contains("dev") || input.name.contains("test")) {
        recs.push(
            "💡 Dev/test environment with 3 zones - Consider using 1-2 zones to save costs"
                .to_string(),
        );
    }

    if input.flavor.contains("mx2") || input.flavor.contains("bx3d") {
        recs.push("💡 Using memory-dense flavor - Verify if high memory is needed".to_string());
    }

    if input.workers > HIGH_WORKER_COUNT {
        recs.push("⚠️ High worker count - Review if all workers are necessary".to_string());
    }

    if input.flavor == DOWNSIZE_FROM && input.zones > 1 {
        if let (Some(current), Some(alternative)) =
            (input.prices.get(DOWNSIZE_FROM), input.prices.get(DOWNSIZE_TO))
        {
            let savings = (current - alternative) * f64::from(input.workers) * HOURS_PER_MONTH;
            recs.push(format!(
                "💰 Consider {} instead - Save ${}/month",
                DOWNSIZE_TO,
                savings.round()
            ));
        }
    }

    if recs.is_empty() {
        recs.push(OPTIMAL_RECOMMENDATION.to_string());
    }

    recs
}

/// Configuration for account-wide analysis
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum concurrent detail fetches (default: 4)
    pub fetch_concurrency: usize,
    /// Instance name attached to log records
    pub instance: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 4,
            instance: "sizing-advisor".to_string(),
        }
    }
}

/// Runs cluster analysis over a [`ClusterSource`]
#[derive(Clone)]
pub struct ClusterAnalyzer {
    prices: PriceTable,
    config: AnalyzerConfig,
    metrics: AdvisorMetrics,
    logger: StructuredLogger,
}

impl ClusterAnalyzer {
    pub fn new(prices: PriceTable, config: AnalyzerConfig) -> Self {
        let logger = StructuredLogger::new(config.instance.clone());
        Self {
            prices,
            config,
            metrics: AdvisorMetrics::new(),
            logger,
        }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Analyze one cluster, recording metrics and data-quality warnings
    pub fn analyze(&self, details: &ClusterDetails) -> ClusterAnalysis {
        let analysis = analyze_cluster(details, &self.prices, Utc::now());

        if !analysis.priced {
            self.metrics.inc_unpriced_clusters();
            self.logger
                .log_unpriced_flavor(&analysis.id, &analysis.flavor, &analysis.normalized_flavor);
        }
        self.metrics.inc_clusters_analyzed();
        self.logger.log_cluster_analyzed(
            &analysis.id,
            &analysis.normalized_flavor,
            analysis.workers,
            analysis.costs.hourly,
            analysis.score.as_str(),
        );

        analysis
    }

    /// List every cluster, fetch details with bounded concurrency and aggregate
    ///
    /// Listing failures are returned. A cluster whose details cannot be
    /// fetched is logged and excluded; totals cover the rest.
    pub async fn analyze_all(&self, source: &dyn ClusterSource) -> Result<ClusterAggregate> {
        let start = Instant::now();
        let summaries = source.list_clusters().await?;
        debug!(clusters = summaries.len(), "Listed clusters");

        let fetched: Vec<(ClusterSummary, Result<ClusterDetails>)> = stream::iter(summaries)
            .map(|summary| async move {
                let details = source.cluster_details(&summary.id).await;
                (summary, details)
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut clusters = Vec::with_capacity(fetched.len());
        let mut failed = Vec::new();
        for (summary, details) in fetched {
            match details {
                Ok(mut details) => {
                    merge_summary(&mut details.cluster, &summary);
                    clusters.push(self.analyze(&details));
                }
                Err(e) => {
                    self.metrics.inc_cluster_analysis_failures();
                    self.logger.log_cluster_failed(&summary.id, &e.to_string());
                    failed.push(FailedCluster {
                        id: summary.id,
                        name: summary.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let aggregate = ClusterAggregate::from_analyses(clusters, failed, Utc::now());
        self.metrics
            .observe_cluster_analysis_latency(start.elapsed().as_secs_f64());
        info!(
            clusters = aggregate.total_clusters,
            failed = aggregate.failed.len(),
            total_monthly_cost = aggregate.total_monthly_cost,
            "Cluster analysis complete"
        );

        Ok(aggregate)
    }
}

/// Fill fields the detail record left empty from the list entry
fn merge_summary(cluster: &mut ClusterSummary, summary: &ClusterSummary) {
    if cluster.id.is_empty() {
        cluster.id = summary.id.clone();
    }
    if cluster.name.is_empty() {
        cluster.name = summary.name.clone();
    }
    if cluster.created_at().is_none() {
        cluster.created_date = summary.created_at().map(str::to_string);
    }
    cluster.state = cluster.state.take().or_else(|| summary.state.clone());
    cluster.worker_count = cluster.worker_count.or(summary.worker_count);
    cluster.location = cluster.location.take().or_else(|| summary.location.clone());
    cluster.region = cluster.region.take().or_else(|| summary.region.clone());
    cluster.resource_group_name = cluster
        .resource_group_name
        .take()
        .or_else(|| summary.resource_group_name.clone());
}
