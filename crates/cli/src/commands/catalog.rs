//! Baseline and flavor catalog commands

use advisor_lib::catalog::{recommend_flavors, Catalog};
use advisor_lib::costing::{format_currency, HOURS_PER_MONTH};
use advisor_lib::{FlavorSeries, NodeFlavor};
use anyhow::{Context, Result};
use colored::Colorize;
use tabled::Tabled;

use crate::output::{color_priority, print_json, print_table, print_warning, OutputFormat};

#[derive(Tabled)]
struct BaselineRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Workers/Zone")]
    workers: u32,
    #[tabled(rename = "vCPU")]
    vcpu: u32,
    #[tabled(rename = "RAM (GB)")]
    ram: u32,
    #[tabled(rename = "Disk (GB)")]
    disk: u32,
}

#[derive(Tabled)]
struct FlavorRow {
    #[tabled(rename = "Flavor")]
    name: String,
    #[tabled(rename = "Series")]
    series: String,
    #[tabled(rename = "vCPU")]
    vcpu: u32,
    #[tabled(rename = "RAM (GB)")]
    ram: u32,
    #[tabled(rename = "Storage (GB)")]
    storage: u32,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Hourly")]
    hourly: String,
    #[tabled(rename = "Monthly/Node")]
    monthly: String,
}

impl From<&NodeFlavor> for FlavorRow {
    fn from(f: &NodeFlavor) -> Self {
        Self {
            name: f.name.clone(),
            series: f.series.to_string(),
            vcpu: f.vcpu,
            ram: f.ram_gb,
            storage: f.storage_gb,
            network: f.network.clone(),
            hourly: format_currency(f.hourly_rate),
            monthly: format_currency(f.hourly_rate * HOURS_PER_MONTH),
        }
    }
}

#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Flavor")]
    flavor: String,
    #[tabled(rename = "vCPU")]
    vcpu: u32,
    #[tabled(rename = "RAM (GB)")]
    ram: u32,
    #[tabled(rename = "Hourly")]
    hourly: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

pub fn list_baselines(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    let baselines = catalog.baselines.all();

    match format {
        OutputFormat::Json => print_json(baselines)?,
        OutputFormat::Table => {
            let rows: Vec<BaselineRow> = baselines
                .iter()
                .map(|b| BaselineRow {
                    id: b.id.clone(),
                    name: b.name.clone(),
                    workers: b.workers,
                    vcpu: b.vcpu,
                    ram: b.ram_gb,
                    disk: b.disk_gb,
                })
                .collect();
            print_table(&rows);
            println!("\nCatalog version: {}", catalog.version);
        }
    }

    Ok(())
}

pub fn show_baseline(catalog: &Catalog, id: &str, format: OutputFormat) -> Result<()> {
    let baseline = catalog.baselines.require(id)?;

    match format {
        OutputFormat::Json => print_json(baseline)?,
        OutputFormat::Table => {
            println!("{}", baseline.name.bold());
            println!("{}", "=".repeat(50));
            println!("ID:              {}", baseline.id.cyan());
            println!("Components:      {}", baseline.components.join(", "));
            println!("Workers/zone:    {}", baseline.workers);
            println!("vCPU/node:       {}", baseline.vcpu);
            println!("RAM/node:        {} GB", baseline.ram_gb);
            println!("Disk/node:       {} GB", baseline.disk_gb);
            if !baseline.description.is_empty() {
                println!("\n{}", baseline.description);
            }
            if !baseline.use_case.is_empty() {
                println!("Use case: {}", baseline.use_case.dimmed());
            }
            if !baseline.industry_solutions.is_empty() {
                println!(
                    "Industry solutions: {}",
                    baseline.industry_solutions.join(", ")
                );
            }
        }
    }

    Ok(())
}

pub fn baseline_flavors(catalog: &Catalog, id: &str, format: OutputFormat) -> Result<()> {
    let baseline = catalog.baselines.require(id)?;
    let suggestions = recommend_flavors(&catalog.flavors, baseline);

    match format {
        OutputFormat::Json => print_json(&suggestions)?,
        OutputFormat::Table => {
            println!(
                "Flavors for {} ({} vCPU, {} GB RAM per node)\n",
                baseline.name.cyan(),
                baseline.vcpu,
                baseline.ram_gb
            );

            let rows: Vec<SuggestionRow> = suggestions
                .iter()
                .filter_map(|s| {
                    s.flavor.as_ref().map(|f| SuggestionRow {
                        priority: color_priority(s.priority),
                        flavor: f.name.clone(),
                        vcpu: f.vcpu,
                        ram: f.ram_gb,
                        hourly: format_currency(f.hourly_rate),
                        reason: s.reason.clone(),
                    })
                })
                .collect();

            if rows.is_empty() {
                for s in &suggestions {
                    print_warning(&s.reason);
                }
            } else {
                print_table(&rows);
            }
        }
    }

    Ok(())
}

pub fn list_flavors(catalog: &Catalog, series: Option<&str>, format: OutputFormat) -> Result<()> {
    let flavors: Vec<&NodeFlavor> = match series {
        Some(s) => {
            let series: FlavorSeries = s
                .parse()
                .with_context(|| format!("Unknown flavor series '{}' (expected bx2 or bx3d)", s))?;
            catalog.flavors.by_series(series)
        }
        None => catalog.flavors.all().iter().collect(),
    };

    match format {
        OutputFormat::Json => print_json(&flavors)?,
        OutputFormat::Table => {
            let rows: Vec<FlavorRow> = flavors.iter().map(|f| FlavorRow::from(*f)).collect();
            print_table(&rows);
            println!("\nTotal: {} flavors", rows.len());
        }
    }

    Ok(())
}

pub fn show_flavor(catalog: &Catalog, id: &str, format: OutputFormat) -> Result<()> {
    let flavor = catalog.flavors.require(id)?;

    match format {
        OutputFormat::Json => print_json(flavor)?,
        OutputFormat::Table => {
            print_table(&[FlavorRow::from(flavor)]);
            if !flavor.description.is_empty() {
                println!("\n{} - {}", flavor.category.bold(), flavor.description);
            }
        }
    }

    Ok(())
}
