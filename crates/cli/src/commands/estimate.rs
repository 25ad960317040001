//! Local cost estimate command

use advisor_lib::advisor::{advise, AdvisoryResult};
use advisor_lib::catalog::{validate_flavor, Catalog, ValidationReport};
use advisor_lib::costing::format_currency;
use advisor_lib::observability::StructuredLogger;
use advisor_lib::recommendations::recommendation_summary;
use advisor_lib::risk::risk_summary;
use advisor_lib::scenario::{SaveOutcome, Scenario};
use advisor_lib::{BaselineProfile, NodeFlavor, ZoneCount};
use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::commands::scenarios::open_store;
use crate::output::{
    color_priority, color_score, color_severity, print_error, print_json, print_success,
    print_table, print_warning, OutputFormat,
};
use crate::EstimateArgs;

#[derive(Tabled)]
struct CostRow {
    #[tabled(rename = "Period")]
    period: &'static str,
    #[tabled(rename = "Per Node")]
    per_node: String,
    #[tabled(rename = "Per Worker (all zones)")]
    per_worker: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct RiskRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Risk")]
    title: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Recommendation")]
    title: String,
    #[tabled(rename = "Action")]
    action: String,
}

#[derive(Serialize)]
struct EstimateOutput<'a> {
    baseline: &'a BaselineProfile,
    flavor: &'a NodeFlavor,
    zones: ZoneCount,
    validation: &'a ValidationReport,
    result: &'a AdvisoryResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<&'a SaveOutcome>,
}

fn resolve_baseline(catalog: &Catalog, args: &EstimateArgs) -> Result<BaselineProfile> {
    if let Some(id) = &args.baseline {
        return Ok(catalog.baselines.require(id)?.clone());
    }
    match (args.workers, args.vcpu, args.ram, args.disk) {
        (Some(workers), Some(vcpu), Some(ram), Some(disk)) => Ok(BaselineProfile::custom(
            "Custom Configuration",
            workers,
            vcpu,
            ram,
            disk,
        )?),
        _ => bail!("Either --baseline or all of --workers, --vcpu, --ram and --disk are required"),
    }
}

/// Run the costing pipeline locally and optionally save the result
pub fn run(catalog: &Catalog, store_path: Option<&Path>, args: EstimateArgs, format: OutputFormat) -> Result<()> {
    let baseline = resolve_baseline(catalog, &args)?;
    let flavor = catalog.flavors.require(&args.flavor)?.clone();
    let zones = ZoneCount::try_from(args.zones)?;

    let validation = validate_flavor(&flavor, &baseline);
    let result = advise(&baseline, &flavor, zones);
    StructuredLogger::new("pfvt-cli").log_estimate(
        &baseline.id,
        &flavor.name,
        zones.get(),
        result.costs.total.monthly,
        result.score.level.as_str(),
        result.risks.len(),
    );

    let saved = match (&args.save, store_path) {
        (Some(name), Some(path)) => {
            let mut store = open_store(path);
            let scenario = Scenario::new(
                name.as_str(),
                args.notes.clone(),
                &baseline,
                &flavor,
                zones,
                result.clone(),
            );
            Some(store.save(scenario))
        }
        _ => None,
    };

    match format {
        OutputFormat::Json => print_json(&EstimateOutput {
            baseline: &baseline,
            flavor: &flavor,
            zones,
            validation: &validation,
            result: &result,
            saved: saved.as_ref(),
        })?,
        OutputFormat::Table => {
            print_estimate(&baseline, &flavor, zones, &validation, &result);
            if let Some(outcome) = &saved {
                println!();
                match &outcome.id {
                    Some(id) if outcome.success => {
                        print_success(&format!("{} ({})", outcome.message, id))
                    }
                    _ => print_error(&outcome.message),
                }
            }
        }
    }

    if let Some(outcome) = saved.filter(|o| !o.success) {
        bail!(outcome.message);
    }
    Ok(())
}

fn print_estimate(
    baseline: &BaselineProfile,
    flavor: &NodeFlavor,
    zones: ZoneCount,
    validation: &ValidationReport,
    result: &AdvisoryResult,
) {
    let costs = &result.costs;

    println!("{}", "Cost Estimate".bold());
    println!("{}", "=".repeat(60));
    println!("Configuration:  {}", baseline.name.cyan());
    println!(
        "Flavor:         {} ({} vCPU, {} GB RAM)",
        flavor.name.cyan(),
        flavor.vcpu,
        flavor.ram_gb
    );
    println!("Zones:          {}", zones);
    println!("Total nodes:    {}", costs.total_nodes);
    println!();

    for issue in &validation.issues {
        print_warning(&issue.message);
    }
    if !validation.issues.is_empty() {
        println!();
    }

    let rows = vec![
        CostRow {
            period: "Hourly",
            per_node: format_currency(costs.per_node.hourly),
            per_worker: format_currency(costs.per_worker.hourly),
            total: format_currency(costs.total.hourly),
        },
        CostRow {
            period: "Monthly",
            per_node: format_currency(costs.per_node.monthly),
            per_worker: format_currency(costs.per_worker.monthly),
            total: format_currency(costs.total.monthly),
        },
        CostRow {
            period: "Yearly",
            per_node: format_currency(costs.per_node.yearly),
            per_worker: format_currency(costs.per_worker.yearly),
            total: format_currency(costs.total.yearly),
        },
    ];
    print_table(&rows);
    println!("{}", costs.calculation.dimmed());
    println!();

    println!(
        "{} {} {} - {}",
        "Cost Score:".bold(),
        color_score(result.score.level),
        result.score.label,
        result.score.message
    );
    println!();

    let risks = risk_summary(&result.risks);
    println!(
        "{} {} ({} high, {} medium, {} low)",
        "Risks:".bold(),
        risks.overall_message,
        risks.high,
        risks.medium,
        risks.low
    );
    if !result.risks.is_empty() {
        let rows: Vec<RiskRow> = result
            .risks
            .iter()
            .map(|r| RiskRow {
                severity: color_severity(r.severity),
                category: r.category.as_str().to_string(),
                title: r.title.clone(),
                recommendation: r.recommendation.clone(),
            })
            .collect();
        print_table(&rows);
    }
    println!();

    let recs = recommendation_summary(&result.recommendations);
    println!("{} {}", "Recommendations:".bold(), recs.total);
    let rows: Vec<RecommendationRow> = result
        .recommendations
        .iter()
        .map(|r| RecommendationRow {
            priority: color_priority(r.priority),
            kind: format!("{} {}", r.kind.icon(), r.kind.as_str()),
            title: r.title.clone(),
            action: r.action.clone(),
        })
        .collect();
    print_table(&rows);
}
