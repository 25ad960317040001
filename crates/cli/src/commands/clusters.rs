//! Live cluster commands, served by the advisor service

use advisor_lib::cluster::{ClusterAggregate, ClusterScore};
use advisor_lib::costing::format_currency;
use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_cluster_score, print_info, print_json, print_success, print_table, print_warning,
    OutputFormat,
};

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Workers")]
    workers: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct AnalysisRow {
    #[tabled(rename = "Cluster")]
    name: String,
    #[tabled(rename = "Flavor")]
    flavor: String,
    #[tabled(rename = "Workers")]
    workers: u32,
    #[tabled(rename = "Zones")]
    zones: usize,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "To Date")]
    to_date: String,
    #[tabled(rename = "Score")]
    score: String,
}

pub async fn list(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let clusters = client.list_clusters().await?;

    match format {
        OutputFormat::Json => print_json(&clusters)?,
        OutputFormat::Table => {
            let rows: Vec<ClusterRow> = clusters
                .iter()
                .map(|c| ClusterRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    state: c.state.clone().unwrap_or_else(|| "-".to_string()),
                    workers: c
                        .worker_count
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    location: c.location_or_region().unwrap_or("-").to_string(),
                    created: c.created_at().unwrap_or("-").to_string(),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

pub async fn analyze(client: &ApiClient, export: bool, format: OutputFormat) -> Result<()> {
    let aggregate = client.analyze_clusters().await?;

    match format {
        OutputFormat::Json => print_json(&aggregate)?,
        OutputFormat::Table => print_aggregate(&aggregate),
    }

    if export {
        let report = client.export_report(&aggregate).await?;
        let url = client.download_url(&report.url)?;
        match format {
            OutputFormat::Json => print_json(&report)?,
            OutputFormat::Table => {
                println!();
                print_success(&format!(
                    "Report {} written for {} clusters",
                    report.filename, report.total_clusters
                ));
                print_info(&format!("Download: {}", url));
            }
        }
    }

    Ok(())
}

fn print_aggregate(aggregate: &ClusterAggregate) {
    let rows: Vec<AnalysisRow> = aggregate
        .clusters
        .iter()
        .map(|c| AnalysisRow {
            name: c.name.clone(),
            flavor: c.flavor.clone(),
            workers: c.workers,
            zones: c.zones,
            monthly: if c.priced {
                format_currency(c.costs.monthly)
            } else {
                "unpriced".dimmed().to_string()
            },
            uptime: c.uptime.clone(),
            to_date: format_currency(c.total_cost_to_date),
            score: color_cluster_score(c.score),
        })
        .collect();
    print_table(&rows);

    println!();
    println!("{}", "Account Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Clusters:        {}", aggregate.total_clusters);
    println!("Workers:         {}", aggregate.total_workers);
    println!("Monthly cost:    {}", format_currency(aggregate.total_monthly_cost));
    println!("Yearly cost:     {}", format_currency(aggregate.total_yearly_cost));
    println!("Cost to date:    {}", format_currency(aggregate.total_cost_to_date));
    println!(
        "Scores:          {} {}  {} {}  {} {}  {} {}",
        color_cluster_score(ClusterScore::Green),
        aggregate.score_counts.green,
        color_cluster_score(ClusterScore::Amber),
        aggregate.score_counts.amber,
        color_cluster_score(ClusterScore::Red),
        aggregate.score_counts.red,
        color_cluster_score(ClusterScore::Unpriced),
        aggregate.score_counts.unpriced
    );

    let with_recs: Vec<_> = aggregate
        .clusters
        .iter()
        .filter(|c| !c.recommendations.is_empty())
        .collect();
    if !with_recs.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        for cluster in with_recs {
            println!("  {}", cluster.name.cyan());
            for rec in &cluster.recommendations {
                println!("    - {}", rec);
            }
        }
    }

    if !aggregate.failed.is_empty() {
        println!();
        print_warning(&format!(
            "{} cluster(s) could not be analyzed",
            aggregate.failed.len()
        ));
        for failed in &aggregate.failed {
            println!("    {} ({}): {}", failed.name, failed.id, failed.error.dimmed());
        }
    }
}
