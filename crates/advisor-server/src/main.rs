//! Sizing advisor - PFVT cluster cost estimation service
//!
//! Serves the costing pipeline, the scenario store and cloud-mode cluster
//! analysis over HTTP, alongside health and metrics endpoints.

use advisor_lib::{
    catalog::Catalog,
    cloud::{ClusterSource, IbmCloudClient},
    cluster::{AnalyzerConfig, ClusterAnalyzer},
    health::{components, HealthRegistry},
    observability::{AdvisorMetrics, StructuredLogger},
    report::XlsxReportSink,
    scenario::{FileBackend, ScenarioStore},
    AdvisorError,
};
use anyhow::{Context, Result};
use sizing_advisor::{api, config::AdvisorConfig};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ADVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting sizing-advisor");

    let config = AdvisorConfig::load()?;
    info!(instance = %config.instance, port = config.api_port, "Advisor configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::CATALOG).await;
    health_registry.register(components::SCENARIO_STORE).await;
    health_registry.register(components::CLOUD_SOURCE).await;

    let metrics = AdvisorMetrics::new();
    let logger = StructuredLogger::new(&config.instance);

    let catalog = Catalog::load(config.catalog_path.as_deref()).context("failed to load catalog")?;

    let store = ScenarioStore::open(FileBackend::new(&config.scenario_store_path));
    info!(
        path = %config.scenario_store_path.display(),
        scenarios = store.len(),
        "Scenario store opened"
    );

    let cluster_source: Option<Arc<dyn ClusterSource>> = match config.cloud_client_config() {
        Ok(client_config) => match IbmCloudClient::new(client_config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                error!(error = %e, "Failed to build IBM Cloud client");
                health_registry
                    .set_unhealthy(components::CLOUD_SOURCE, e.to_string())
                    .await;
                None
            }
        },
        Err(AdvisorError::NotConfigured(what)) => {
            warn!("IBM Cloud API key not set, cluster analysis disabled");
            health_registry
                .set_not_configured(components::CLOUD_SOURCE, format!("{} not configured", what))
                .await;
            None
        }
        Err(e) => return Err(e).context("invalid cloud configuration"),
    };

    logger.log_startup(ADVISOR_VERSION, &catalog.version, cluster_source.is_some());

    let analyzer = ClusterAnalyzer::new(
        catalog.cloud_pricing.clone(),
        AnalyzerConfig {
            fetch_concurrency: config.cluster_fetch_concurrency,
            instance: config.instance.clone(),
        },
    );

    let app_state = Arc::new(api::AppState {
        catalog: Arc::new(catalog),
        scenarios: Arc::new(RwLock::new(store)),
        cluster_source,
        analyzer,
        report_sink: Arc::new(XlsxReportSink::new(&config.report_dir)),
        report_dir: config.report_dir.clone(),
        health_registry: health_registry.clone(),
        metrics,
        logger: logger.clone(),
    });

    // Mark advisor as ready after initialization
    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server exited"),
                Ok(Err(e)) => {
                    logger.log_shutdown("API server failed");
                    return Err(e);
                }
                Err(e) => {
                    logger.log_shutdown("API server task panicked");
                    return Err(e.into());
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
