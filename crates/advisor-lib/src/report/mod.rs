//! Cluster analysis reports
//!
//! [`ClusterReport`] lays an aggregate out as three sheets of plain rows
//! (summary, per-cluster details, recommendations). A [`ReportSink`] turns
//! that layout into a downloadable artifact.

mod xlsx;

pub use xlsx::XlsxReportSink;

use crate::cluster::{ClusterAggregate, ClusterAnalysis, ClusterScore};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const REPORT_TITLE: &str = "IBM Cloud Cluster Analysis Report";

/// Minimum height of a recommendations row, in points
const MIN_ROW_HEIGHT: f64 = 20.0;
/// Height per recommendation line, in points
const LINE_HEIGHT: f64 = 15.0;

/// One metric on the summary sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub metric: String,
    pub value: String,
}

/// One score bucket on the summary sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistributionRow {
    pub label: String,
    pub score: ClusterScore,
    pub count: usize,
}

/// One row of the details sheet
///
/// The totals row leaves the per-cluster columns empty and has no score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub name: String,
    pub state: String,
    pub created_date: String,
    pub uptime: String,
    pub workers: String,
    pub flavor: String,
    pub cpu: String,
    pub memory: String,
    pub disk: String,
    pub zones: String,
    pub location: String,
    pub hourly: String,
    pub monthly: String,
    pub yearly: String,
    pub score: Option<ClusterScore>,
    pub total_cost_to_date: String,
}

impl DetailRow {
    pub const HEADERS: [(&'static str, f64); 16] = [
        ("Cluster Name", 25.0),
        ("State", 12.0),
        ("Created Date", 15.0),
        ("Uptime", 15.0),
        ("Workers", 10.0),
        ("Flavor", 15.0),
        ("CPU/Node", 10.0),
        ("Memory/Node (GB)", 18.0),
        ("Disk/Node (GB)", 16.0),
        ("Zones", 8.0),
        ("Location", 15.0),
        ("Hourly Cost", 12.0),
        ("Monthly Cost", 15.0),
        ("Yearly Cost", 15.0),
        ("Cost Score", 12.0),
        ("Total Cost To Date", 18.0),
    ];

    /// Column index of the score cell
    pub const SCORE_COLUMN: usize = 14;

    fn from_analysis(cluster: &ClusterAnalysis) -> Self {
        Self {
            name: cluster.name.clone(),
            state: cluster.state.clone(),
            created_date: cluster
                .created_date
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            uptime: cluster.uptime.clone(),
            workers: cluster.workers.to_string(),
            flavor: cluster.flavor.clone(),
            cpu: or_not_available(cluster.cpu),
            memory: or_not_available(cluster.memory),
            disk: or_not_available(cluster.disk),
            zones: cluster.zones.to_string(),
            location: cluster.location.clone(),
            hourly: dollars(cluster.costs.hourly),
            monthly: dollars(cluster.costs.monthly),
            yearly: dollars(cluster.costs.yearly),
            score: Some(cluster.score),
            total_cost_to_date: dollars(cluster.total_cost_to_date),
        }
    }

    /// Cell values in column order; the score column holds its label
    pub fn cells(&self) -> [String; 16] {
        [
            self.name.clone(),
            self.state.clone(),
            self.created_date.clone(),
            self.uptime.clone(),
            self.workers.clone(),
            self.flavor.clone(),
            self.cpu.clone(),
            self.memory.clone(),
            self.disk.clone(),
            self.zones.clone(),
            self.location.clone(),
            self.hourly.clone(),
            self.monthly.clone(),
            self.yearly.clone(),
            self.score.map(|s| s.to_string()).unwrap_or_default(),
            self.total_cost_to_date.clone(),
        ]
    }
}

/// One row of the recommendations sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub name: String,
    pub score: ClusterScore,
    pub monthly: String,
    /// Recommendations joined with newlines
    pub recommendations: String,
    pub row_height: f64,
}

impl RecommendationRow {
    pub const HEADERS: [(&'static str, f64); 4] = [
        ("Cluster Name", 25.0),
        ("Cost Score", 12.0),
        ("Current Monthly Cost", 20.0),
        ("Recommendations", 80.0),
    ];

    fn from_analysis(cluster: &ClusterAnalysis) -> Self {
        Self {
            name: cluster.name.clone(),
            score: cluster.score,
            monthly: format!("{}/month", dollars(cluster.costs.monthly)),
            recommendations: cluster.recommendations.join("\n"),
            row_height: MIN_ROW_HEIGHT.max(LINE_HEIGHT * cluster.recommendations.len() as f64),
        }
    }
}

/// Report layout for one aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Vec<SummaryRow>,
    pub score_distribution: Vec<ScoreDistributionRow>,
    pub details: Vec<DetailRow>,
    pub totals: DetailRow,
    pub recommendations: Vec<RecommendationRow>,
}

impl ClusterReport {
    pub fn from_aggregate(aggregate: &ClusterAggregate) -> Self {
        let average = if aggregate.total_clusters == 0 {
            0.0
        } else {
            aggregate.total_monthly_cost / aggregate.total_clusters as f64
        };

        let summary = vec![
            summary_row("Total Clusters", aggregate.total_clusters.to_string()),
            summary_row("Total Workers", aggregate.total_workers.to_string()),
            summary_row("Total Monthly Cost", dollars(aggregate.total_monthly_cost)),
            summary_row("Total Yearly Cost", dollars(aggregate.total_yearly_cost)),
            summary_row("Total Cost To Date", dollars(aggregate.total_cost_to_date)),
            summary_row(
                "Average Cost per Cluster",
                format!("{}/month", dollars(average)),
            ),
        ];

        let score_distribution = ClusterScore::ALL
            .iter()
            .map(|score| ScoreDistributionRow {
                label: distribution_label(*score).to_string(),
                score: *score,
                count: aggregate.score_counts.get(*score),
            })
            .collect();

        let totals = DetailRow {
            name: "TOTAL".to_string(),
            workers: aggregate.total_workers.to_string(),
            monthly: dollars(aggregate.total_monthly_cost),
            yearly: dollars(aggregate.total_yearly_cost),
            total_cost_to_date: dollars(aggregate.total_cost_to_date),
            ..Default::default()
        };

        Self {
            title: REPORT_TITLE.to_string(),
            generated_at: aggregate.generated_at,
            summary,
            score_distribution,
            details: aggregate.clusters.iter().map(DetailRow::from_analysis).collect(),
            totals,
            recommendations: aggregate
                .clusters
                .iter()
                .map(RecommendationRow::from_analysis)
                .collect(),
        }
    }

    /// `ibm-cloud-cluster-analysis-<YYYY-MM-DD>.xlsx`
    pub fn file_name(&self) -> String {
        format!(
            "ibm-cloud-cluster-analysis-{}.xlsx",
            self.generated_at.format("%Y-%m-%d")
        )
    }
}

/// File produced by a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub filename: String,
    pub path: PathBuf,
    /// Download path relative to the service root
    pub url: String,
}

/// Renders a [`ClusterReport`] into a downloadable file
pub trait ReportSink: Send + Sync {
    fn write(&self, report: &ClusterReport) -> Result<ReportArtifact>;
}

fn summary_row(metric: &str, value: String) -> SummaryRow {
    SummaryRow {
        metric: metric.to_string(),
        value,
    }
}

fn distribution_label(score: ClusterScore) -> &'static str {
    match score {
        ClusterScore::Green => "GREEN (Optimal)",
        ClusterScore::Amber => "AMBER (Acceptable)",
        ClusterScore::Red => "RED (Over-provisioned)",
        ClusterScore::Unpriced => "UNPRICED (No price data)",
    }
}

fn dollars(value: f64) -> String {
    format!("${:.2}", value)
}

fn or_not_available(value: u32) -> String {
    if value == 0 {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}
