//! PFVT Cost & Sizing Advisor CLI
//!
//! A command-line tool for estimating cluster costs, browsing the sizing
//! catalog, managing saved scenarios and analyzing live cloud clusters.

mod client;
mod commands;
mod config;
mod output;

use advisor_lib::catalog::Catalog;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use commands::{catalog, clusters, estimate, scenarios};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PFVT Cost & Sizing Advisor CLI
#[derive(Parser)]
#[command(name = "pfvt")]
#[command(author, version, about = "CLI for the PFVT Cost & Sizing Advisor", long_about = None)]
pub struct Cli {
    /// Advisor service URL for cloud commands (can also be set via PFVT_API_URL env var)
    #[arg(long, env = "PFVT_API_URL")]
    pub api_url: Option<String>,

    /// Scenario store file (defaults to ~/.config/pfvt/scenarios.json)
    #[arg(long, env = "PFVT_SCENARIO_STORE")]
    pub store: Option<PathBuf>,

    /// Catalog document replacing the built-in one
    #[arg(long, env = "PFVT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate cost, risks and recommendations for a configuration
    Estimate(EstimateArgs),

    /// Browse baseline configurations
    #[command(subcommand)]
    Baselines(BaselineCommands),

    /// Browse worker flavors
    #[command(subcommand)]
    Flavors(FlavorCommands),

    /// Manage saved scenarios
    #[command(subcommand)]
    Scenarios(ScenarioCommands),

    /// Analyze live clusters through the advisor service
    #[command(subcommand)]
    Clusters(ClusterCommands),
}

#[derive(Args)]
pub struct EstimateArgs {
    /// Baseline configuration ID (e.g. config-1)
    #[arg(long, short, conflicts_with_all = ["workers", "vcpu", "ram", "disk"])]
    pub baseline: Option<String>,

    /// Custom baseline: workers per zone
    #[arg(long, requires_all = ["vcpu", "ram", "disk"])]
    pub workers: Option<u32>,

    /// Custom baseline: vCPU per node
    #[arg(long, requires = "workers")]
    pub vcpu: Option<u32>,

    /// Custom baseline: RAM per node in GB
    #[arg(long, requires = "workers")]
    pub ram: Option<u32>,

    /// Custom baseline: disk per node in GB
    #[arg(long, requires = "workers")]
    pub disk: Option<u32>,

    /// Flavor ID or name (e.g. bx2-16x32 or bx2.16x32)
    #[arg(long)]
    pub flavor: String,

    /// Number of availability zones (1-3)
    #[arg(long, short, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub zones: u8,

    /// Save the result as a scenario with this name
    #[arg(long)]
    pub save: Option<String>,

    /// Notes stored with the saved scenario
    #[arg(long, requires = "save")]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum BaselineCommands {
    /// List baseline configurations
    List,

    /// Show one baseline
    Show {
        /// Baseline ID
        id: String,
    },

    /// Suggest flavors that satisfy a baseline
    Flavors {
        /// Baseline ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum FlavorCommands {
    /// List flavors
    List {
        /// Filter by series (bx2, bx3d)
        #[arg(long, short)]
        series: Option<String>,
    },

    /// Show one flavor
    Show {
        /// Flavor ID or name
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ScenarioCommands {
    /// List saved scenarios, newest first
    List,

    /// Show a saved scenario
    Show {
        /// Scenario ID
        id: String,
    },

    /// Delete a saved scenario
    Delete {
        /// Scenario ID
        id: String,
    },

    /// Search scenarios by name, baseline or notes
    Search {
        /// Text to search for
        query: String,
    },

    /// Export scenarios as JSON
    Export {
        /// Only export these scenario IDs
        ids: Vec<String>,

        /// Output file path (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import scenarios from an export file
    Import {
        /// Export file to read
        file: PathBuf,
    },

    /// Compare monthly costs of saved scenarios
    Compare {
        /// Scenario IDs to compare
        #[arg(required = true, num_args = 2..)]
        ids: Vec<String>,
    },

    /// Show scenario store statistics
    Stats,
}

#[derive(Subcommand)]
pub enum ClusterCommands {
    /// List clusters in the cloud account
    List,

    /// Analyze cost of every cluster in the account
    Analyze {
        /// Also write a spreadsheet report
        #[arg(long)]
        export: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let file_config = config::Config::load()?;
    let format = match cli.format {
        Some(format) => format,
        None => file_config
            .default_format
            .as_deref()
            .map(str::parse::<output::OutputFormat>)
            .transpose()
            .context("Invalid default_format in config file")?
            .unwrap_or_default(),
    };

    let load_catalog = || Catalog::load(cli.catalog.as_deref()).context("Failed to load catalog");

    match cli.command {
        Commands::Estimate(args) => {
            let catalog = load_catalog()?;
            let store_path = match args.save {
                Some(_) => Some(config::resolve_store_path(cli.store.clone(), &file_config)?),
                None => None,
            };
            estimate::run(&catalog, store_path.as_deref(), args, format)?;
        }
        Commands::Baselines(cmd) => {
            let catalog = load_catalog()?;
            match cmd {
                BaselineCommands::List => catalog::list_baselines(&catalog, format)?,
                BaselineCommands::Show { id } => catalog::show_baseline(&catalog, &id, format)?,
                BaselineCommands::Flavors { id } => {
                    catalog::baseline_flavors(&catalog, &id, format)?
                }
            }
        }
        Commands::Flavors(cmd) => {
            let catalog = load_catalog()?;
            match cmd {
                FlavorCommands::List { series } => {
                    catalog::list_flavors(&catalog, series.as_deref(), format)?
                }
                FlavorCommands::Show { id } => catalog::show_flavor(&catalog, &id, format)?,
            }
        }
        Commands::Scenarios(cmd) => {
            let store_path = config::resolve_store_path(cli.store.clone(), &file_config)?;
            let mut store = scenarios::open_store(&store_path);
            match cmd {
                ScenarioCommands::List => scenarios::list(&store, format)?,
                ScenarioCommands::Show { id } => scenarios::show(&store, &id, format)?,
                ScenarioCommands::Delete { id } => scenarios::delete(&mut store, &id, format)?,
                ScenarioCommands::Search { query } => scenarios::search(&store, &query, format)?,
                ScenarioCommands::Export { ids, output } => {
                    scenarios::export(&store, &ids, output.as_deref())?
                }
                ScenarioCommands::Import { file } => {
                    scenarios::import(&mut store, &file, format)?
                }
                ScenarioCommands::Compare { ids } => scenarios::compare(&store, &ids, format)?,
                ScenarioCommands::Stats => scenarios::stats(&store, format)?,
            }
        }
        Commands::Clusters(cmd) => {
            let api_url = config::resolve_api_url(cli.api_url.clone(), &file_config);
            let client = client::ApiClient::new(&api_url)?;
            match cmd {
                ClusterCommands::List => clusters::list(&client, format).await?,
                ClusterCommands::Analyze { export } => {
                    clusters::analyze(&client, export, format).await?
                }
            }
        }
    }

    Ok(())
}
