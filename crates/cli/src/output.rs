//! Output formatting utilities

use advisor_lib::cluster::ClusterScore;
use advisor_lib::costing::ScoreLevel;
use advisor_lib::{Priority, Severity};
use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true).map_err(|e| anyhow::anyhow!(e))
    }
}

/// Print a table from a list of rows
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Pretty-print any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn color_score(level: ScoreLevel) -> String {
    match level {
        ScoreLevel::Green => level.as_str().green().bold().to_string(),
        ScoreLevel::Amber => level.as_str().yellow().bold().to_string(),
        ScoreLevel::Red => level.as_str().red().bold().to_string(),
    }
}

pub fn color_cluster_score(score: ClusterScore) -> String {
    match score {
        ClusterScore::Green => score.as_str().green().to_string(),
        ClusterScore::Amber => score.as_str().yellow().to_string(),
        ClusterScore::Red => score.as_str().red().to_string(),
        ClusterScore::Unpriced => score.as_str().dimmed().to_string(),
    }
}

pub fn color_severity(severity: Severity) -> String {
    match severity {
        Severity::High => severity.as_str().red().to_string(),
        Severity::Medium => severity.as_str().yellow().to_string(),
        Severity::Low => severity.as_str().blue().to_string(),
    }
}

pub fn color_priority(priority: Priority) -> String {
    match priority {
        Priority::High => priority.as_str().red().to_string(),
        Priority::Medium => priority.as_str().yellow().to_string(),
        Priority::Low => priority.as_str().dimmed().to_string(),
    }
}

/// Signed dollar difference, e.g. `+$120.00`
pub fn format_delta(amount: f64) -> String {
    if amount > 0.0 {
        format!("+{}", advisor_lib::costing::format_currency(amount))
    } else {
        advisor_lib::costing::format_currency(amount)
    }
}
