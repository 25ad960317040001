//! Saved scenario commands

use advisor_lib::costing::{compare_scenarios, format_currency};
use advisor_lib::scenario::{FileBackend, Scenario, ScenarioStore};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use tabled::Tabled;
use tracing::debug;

use crate::output::{
    color_score, format_delta, print_error, print_info, print_json, print_success, print_table,
    OutputFormat,
};

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Baseline")]
    baseline: String,
    #[tabled(rename = "Flavor")]
    flavor: String,
    #[tabled(rename = "Zones")]
    zones: u8,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Scenario> for ScenarioRow {
    fn from(s: &Scenario) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            baseline: s.baseline.name.clone(),
            flavor: s.flavor.name.clone(),
            zones: s.zones.get(),
            monthly: format_currency(s.monthly_cost()),
            score: color_score(s.score()),
            created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Scenario")]
    name: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "vs Cheapest")]
    diff_from_min: String,
    #[tabled(rename = "vs Average")]
    diff_from_avg: String,
    #[tabled(rename = "")]
    marker: String,
}

/// Open the file-backed store; an unreadable file starts empty
pub fn open_store(path: &Path) -> ScenarioStore {
    debug!(path = %path.display(), "Opening scenario store");
    ScenarioStore::open(FileBackend::new(path))
}

fn print_scenarios(scenarios: &[&Scenario], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(scenarios)?,
        OutputFormat::Table => {
            let rows: Vec<ScenarioRow> = scenarios.iter().map(|s| ScenarioRow::from(*s)).collect();
            print_table(&rows);
        }
    }
    Ok(())
}

pub fn list(store: &ScenarioStore, format: OutputFormat) -> Result<()> {
    let scenarios = store.load_all();
    print_scenarios(&scenarios, format)?;
    if format == OutputFormat::Table && !scenarios.is_empty() {
        println!("\n{} of {} scenarios", scenarios.len(), store.capacity());
    }
    Ok(())
}

pub fn show(store: &ScenarioStore, id: &str, format: OutputFormat) -> Result<()> {
    let scenario = store.require(id)?;

    match format {
        OutputFormat::Json => print_json(scenario)?,
        OutputFormat::Table => {
            let results = &scenario.results;
            println!("{}", scenario.name.bold());
            println!("{}", "=".repeat(50));
            println!("ID:          {}", scenario.id.cyan());
            println!("Baseline:    {}", scenario.baseline.name);
            println!("Flavor:      {}", scenario.flavor.name);
            println!("Zones:       {}", scenario.zones);
            println!("Nodes:       {}", results.costs.total_nodes);
            println!("Hourly:      {}", format_currency(results.costs.total.hourly));
            println!("Monthly:     {}", format_currency(results.costs.total.monthly));
            println!("Yearly:      {}", format_currency(results.costs.total.yearly));
            println!(
                "Score:       {} {}",
                color_score(results.score.level),
                results.score.label
            );
            println!("Risks:       {}", results.risks.len());
            println!("Recs:        {}", results.recommendations.len());
            println!("Created:     {}", scenario.created_at.to_rfc3339());
            println!("Updated:     {}", scenario.updated_at.to_rfc3339());
            if let Some(notes) = &scenario.notes {
                println!("\n{}", notes.dimmed());
            }
        }
    }

    Ok(())
}

pub fn delete(store: &mut ScenarioStore, id: &str, format: OutputFormat) -> Result<()> {
    let outcome = store.delete(id);

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Table if outcome.success => print_success(&outcome.message),
        OutputFormat::Table => print_error(&outcome.message),
    }

    if !outcome.success {
        bail!(outcome.message);
    }
    Ok(())
}

pub fn search(store: &ScenarioStore, query: &str, format: OutputFormat) -> Result<()> {
    let matches = store.search(query);
    if format == OutputFormat::Table {
        print_info(&format!("{} scenario(s) match '{}'", matches.len(), query));
    }
    print_scenarios(&matches, format)
}

/// Write the export document to `output`, or stdout when absent
pub fn export(store: &ScenarioStore, ids: &[String], output: Option<&Path>) -> Result<()> {
    let document = if ids.is_empty() {
        store.export_all()?
    } else {
        store.export_selected(ids)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            print_success(&format!("Exported scenarios to {}", path.display()));
        }
        None => println!("{}", document),
    }

    Ok(())
}

pub fn import(store: &mut ScenarioStore, file: &Path, format: OutputFormat) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let outcome = store.import_all(&content)?;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Table if outcome.success => print_success(&outcome.message),
        OutputFormat::Table => print_error(&outcome.message),
    }

    if !outcome.success {
        bail!(outcome.message);
    }
    Ok(())
}

pub fn compare(store: &ScenarioStore, ids: &[String], format: OutputFormat) -> Result<()> {
    let scenarios = ids
        .iter()
        .map(|id| store.require(id))
        .collect::<advisor_lib::Result<Vec<_>>>()?;

    let comparison = compare_scenarios(
        scenarios
            .iter()
            .map(|s| (s.id.as_str(), &s.results.costs)),
    )
    .context("Nothing to compare")?;

    match format {
        OutputFormat::Json => print_json(&comparison)?,
        OutputFormat::Table => {
            let rows: Vec<ComparisonRow> = comparison
                .scenarios
                .iter()
                .zip(&scenarios)
                .map(|(c, s)| ComparisonRow {
                    name: s.name.clone(),
                    monthly: format_currency(c.monthly),
                    diff_from_min: format!(
                        "{} ({:.1}%)",
                        format_delta(c.diff_from_min),
                        c.percent_diff_from_min
                    ),
                    diff_from_avg: format_delta(c.diff_from_avg),
                    marker: if c.is_cheapest {
                        "cheapest".green().to_string()
                    } else if c.is_most_expensive {
                        "most expensive".red().to_string()
                    } else {
                        String::new()
                    },
                })
                .collect();
            print_table(&rows);
            println!(
                "\nRange: {} to {} (spread {}, average {})",
                format_currency(comparison.min),
                format_currency(comparison.max),
                format_currency(comparison.range),
                format_currency(comparison.average)
            );
        }
    }

    Ok(())
}

pub fn stats(store: &ScenarioStore, format: OutputFormat) -> Result<()> {
    let stats = store.stats();

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => {
            println!("{}", "Scenario Store".bold());
            println!("{}", "=".repeat(50));
            println!(
                "Scenarios:    {} / {} ({:.0}% used)",
                stats.total_scenarios, stats.max_scenarios, stats.utilization_percent
            );
            for (score, count) in &stats.cost_scores {
                println!("  {:<10} {}", score, count);
            }
            println!("Average:      {}", format_currency(stats.average_monthly_cost));
            println!("Cheapest:     {}", format_currency(stats.min_monthly_cost));
            println!("Most costly:  {}", format_currency(stats.max_monthly_cost));
            println!("Modified:     {}", stats.last_modified.to_rfc3339());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_lib::advisor::advise;
    use advisor_lib::catalog::Catalog;
    use advisor_lib::ZoneCount;

    fn saved_store(dir: &Path) -> (ScenarioStore, Vec<String>) {
        let catalog = Catalog::embedded().unwrap();
        let baseline = catalog.baselines.require("config-1").unwrap();
        let mut store = open_store(&dir.join("scenarios.json"));
        let mut ids = Vec::new();
        for (name, flavor_id) in [("Small", "bx2-16x64"), ("Large", "bx2-32x128")] {
            let flavor = catalog.flavors.require(flavor_id).unwrap();
            let result = advise(baseline, flavor, ZoneCount::One);
            let outcome = store.save(Scenario::new(name, None, baseline, flavor, ZoneCount::One, result));
            ids.push(outcome.id.unwrap());
        }
        (store, ids)
    }

    #[test]
    fn test_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let (_, ids) = saved_store(dir.path());

        let reopened = open_store(&dir.path().join("scenarios.json"));
        assert_eq!(reopened.len(), 2);
        assert!(reopened.load(&ids[0]).is_some());
    }

    #[test]
    fn test_delete_unknown_scenario_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, _) = saved_store(dir.path());

        let err = delete(&mut store, "scenario_missing", OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("Scenario not found"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_export_then_import_into_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let (store, ids) = saved_store(dir.path());
        let export_path = dir.path().join("export.json");

        export(&store, &ids[..1], Some(&export_path)).unwrap();

        let mut other = open_store(&dir.path().join("other.json"));
        import(&mut other, &export_path, OutputFormat::Json).unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_compare_requires_known_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (store, ids) = saved_store(dir.path());

        assert!(compare(&store, &ids, OutputFormat::Json).is_ok());
        let unknown = vec![ids[0].clone(), "scenario_missing".to_string()];
        assert!(compare(&store, &unknown, OutputFormat::Json).is_err());
    }
}
