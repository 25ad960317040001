//! HTTP API for estimates, scenarios, cloud cluster analysis, health checks
//! and Prometheus metrics

use advisor_lib::{
    advise,
    catalog::{recommend_flavors, Catalog},
    cloud::ClusterSource,
    cluster::{ClusterAggregate, ClusterAnalyzer},
    health::{components, ComponentStatus, HealthRegistry},
    observability::{AdvisorMetrics, StructuredLogger},
    report::{ClusterReport, ReportSink},
    scenario::{Scenario, ScenarioStore},
    AdvisorError, AdvisoryResult, BaselineProfile, FlavorSeries, NodeFlavor, ZoneCount,
};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared application state
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub scenarios: Arc<RwLock<ScenarioStore>>,
    /// `None` when cloud credentials are missing
    pub cluster_source: Option<Arc<dyn ClusterSource>>,
    pub analyzer: ClusterAnalyzer,
    pub report_sink: Arc<dyn ReportSink>,
    pub report_dir: PathBuf,
    pub health_registry: HealthRegistry,
    pub metrics: AdvisorMetrics,
    pub logger: StructuredLogger,
}

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    NotConfigured(String),
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(m)
            | ApiError::BadRequest(m)
            | ApiError::NotConfigured(m)
            | ApiError::Internal(m) => m,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self.message(), "Request failed");
        }
        let body = ErrorBody {
            error: self.message(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::UnknownBaseline(_)
            | AdvisorError::UnknownFlavor(_)
            | AdvisorError::ScenarioNotFound(_) => ApiError::NotFound(err.to_string()),
            AdvisorError::InvalidZoneCount(_)
            | AdvisorError::InvalidBaseline(_)
            | AdvisorError::InvalidImport(_)
            | AdvisorError::InvalidDeploy(_)
            | AdvisorError::UnknownScoreLevel(_)
            | AdvisorError::Serialization(_) => ApiError::BadRequest(err.to_string()),
            AdvisorError::NotConfigured(_) => ApiError::NotConfigured(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// User-supplied minimums used instead of a catalog baseline
#[derive(Debug, Clone, Deserialize)]
pub struct CustomBaseline {
    #[serde(default = "default_custom_name")]
    pub name: String,
    pub workers: u32,
    pub vcpu: u32,
    pub ram_gb: u32,
    pub disk_gb: u32,
}

fn default_custom_name() -> String {
    "Custom Configuration".to_string()
}

/// Baseline, flavor and zone selection
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub baseline_id: Option<String>,
    #[serde(default)]
    pub baseline: Option<CustomBaseline>,
    pub flavor_id: String,
    pub zones: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveScenarioRequest {
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub selection: SelectionRequest,
}

#[derive(Debug, Deserialize)]
pub struct FlavorQuery {
    pub series: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub total_clusters: usize,
}

impl AppState {
    fn resolve_selection(&self, selection: &SelectionRequest) -> ApiResult<(BaselineProfile, NodeFlavor, ZoneCount)> {
        let baseline = match (&selection.baseline_id, &selection.baseline) {
            (Some(id), _) => self.catalog.baselines.require(id)?.clone(),
            (None, Some(custom)) => BaselineProfile::custom(
                custom.name.clone(),
                custom.workers,
                custom.vcpu,
                custom.ram_gb,
                custom.disk_gb,
            )?,
            (None, None) => {
                return Err(ApiError::BadRequest(
                    "baseline_id or baseline is required".to_string(),
                ))
            }
        };
        let flavor = self.catalog.flavors.require(&selection.flavor_id)?.clone();
        let zones = ZoneCount::try_from(selection.zones)?;
        Ok((baseline, flavor, zones))
    }

    fn run_estimate(&self, baseline: &BaselineProfile, flavor: &NodeFlavor, zones: ZoneCount) -> AdvisoryResult {
        let result = advise(baseline, flavor, zones);
        self.metrics.inc_estimates_computed();
        self.logger.log_estimate(
            &baseline.id,
            &flavor.name,
            zones.get(),
            result.costs.total.monthly,
            result.score.level.as_str(),
            result.risks.len(),
        );
        result
    }

    fn cloud(&self) -> ApiResult<&Arc<dyn ClusterSource>> {
        self.cluster_source.as_ref().ok_or_else(|| {
            ApiError::NotConfigured(
                "IBM Cloud service not configured. Please set IBM_CLOUD_API_KEY environment variable."
                    .to_string(),
            )
        })
    }

    async fn analyze_account(&self) -> ApiResult<ClusterAggregate> {
        let source = self.cloud()?;
        match self.analyzer.analyze_all(source.as_ref()).await {
            Ok(aggregate) => {
                self.health_registry
                    .set_healthy(components::CLOUD_SOURCE)
                    .await;
                Ok(aggregate)
            }
            Err(e) => {
                warn!(error = %e, "Cluster analysis failed");
                self.health_registry
                    .set_degraded(components::CLOUD_SOURCE, e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded | ComponentStatus::NotConfigured => {
            StatusCode::OK
        }
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(format!("failed to encode metrics: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        buffer,
    ))
}

async fn list_baselines(State(state): State<Arc<AppState>>) -> Json<Vec<BaselineProfile>> {
    Json(state.catalog.baselines.all().to_vec())
}

async fn get_baseline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<BaselineProfile>> {
    Ok(Json(state.catalog.baselines.require(&id)?.clone()))
}

async fn baseline_flavors(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let baseline = state.catalog.baselines.require(&id)?;
    Ok(Json(recommend_flavors(&state.catalog.flavors, baseline)))
}

async fn list_flavors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlavorQuery>,
) -> ApiResult<Json<Vec<NodeFlavor>>> {
    let flavors = match query.series.as_deref() {
        Some(series) => {
            let series: FlavorSeries = series
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("unknown flavor series {}", series)))?;
            state
                .catalog
                .flavors
                .by_series(series)
                .into_iter()
                .cloned()
                .collect()
        }
        None => state.catalog.flavors.all().to_vec(),
    };
    Ok(Json(flavors))
}

async fn get_flavor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<NodeFlavor>> {
    Ok(Json(state.catalog.flavors.require(&id)?.clone()))
}

async fn estimate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> ApiResult<Json<AdvisoryResult>> {
    let Json(request) = payload?;
    let (baseline, flavor, zones) = state.resolve_selection(&request)?;
    Ok(Json(state.run_estimate(&baseline, &flavor, zones)))
}

async fn list_scenarios(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Scenario>> {
    let store = state.scenarios.read().await;
    let scenarios = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => store.search(q),
        _ => store.load_all(),
    };
    Json(scenarios.into_iter().cloned().collect())
}

async fn save_scenario(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveScenarioRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Scenario name is required".to_string()));
    }
    let (baseline, flavor, zones) = state.resolve_selection(&request.selection)?;
    let result = state.run_estimate(&baseline, &flavor, zones);
    let scenario = Scenario::new(
        request.name.trim(),
        request.notes,
        &baseline,
        &flavor,
        zones,
        result,
    );

    let outcome = state.scenarios.write().await.save(scenario);
    if outcome.success {
        state
            .health_registry
            .set_healthy(components::SCENARIO_STORE)
            .await;
        Ok((StatusCode::CREATED, Json(outcome)))
    } else {
        state
            .health_registry
            .set_degraded(components::SCENARIO_STORE, outcome.message.clone())
            .await;
        Err(ApiError::Internal(outcome.message))
    }
}

async fn get_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Scenario>> {
    let store = state.scenarios.read().await;
    Ok(Json(store.require(&id)?.clone()))
}

async fn delete_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.scenarios.write().await.delete(&id);
    if outcome.success {
        Ok(Json(outcome))
    } else {
        Err(ApiError::NotFound(outcome.message))
    }
}

async fn scenario_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.scenarios.read().await.stats())
}

async fn export_scenarios(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let content = state.scenarios.read().await.export_all()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        content,
    ))
}

async fn import_scenarios(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.scenarios.write().await.import_all(&body)?;
    info!(imported = outcome.imported_count, "Imported scenarios");
    Ok(Json(outcome))
}

async fn list_clusters(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let clusters = state.cloud()?.list_clusters().await?;
    Ok(Json(clusters))
}

async fn analyze_clusters(State(state): State<Arc<AppState>>) -> ApiResult<Json<ClusterAggregate>> {
    Ok(Json(state.analyze_account().await?))
}

/// Write a report for a posted aggregate, or analyze the account when the
/// body is empty
async fn export_clusters(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ReportResponse>> {
    let aggregate = if body.iter().all(u8::is_ascii_whitespace) {
        state.analyze_account().await?
    } else {
        serde_json::from_slice::<ClusterAggregate>(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid cluster aggregate: {}", e)))?
    };

    let report = ClusterReport::from_aggregate(&aggregate);
    let sink = state.report_sink.clone();
    let artifact = tokio::task::spawn_blocking(move || sink.write(&report))
        .await
        .map_err(|e| ApiError::Internal(format!("report task failed: {}", e)))??;

    Ok(Json(ReportResponse {
        success: true,
        path: artifact.path.display().to_string(),
        filename: artifact.filename,
        url: artifact.url,
        total_clusters: aggregate.total_clusters,
    }))
}

async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let valid = !filename.starts_with('.')
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if !valid {
        return Err(ApiError::BadRequest(format!("invalid file name {}", filename)));
    }

    let bytes = match tokio::fs::read(state.report_dir.join(&filename)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("report not found: {}", filename)))
        }
        Err(e) => return Err(AdvisorError::from(e).into()),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/baselines", get(list_baselines))
        .route("/api/v1/baselines/:id", get(get_baseline))
        .route("/api/v1/baselines/:id/flavors", get(baseline_flavors))
        .route("/api/v1/flavors", get(list_flavors))
        .route("/api/v1/flavors/:id", get(get_flavor))
        .route("/api/v1/estimate", post(estimate))
        .route("/api/v1/scenarios", get(list_scenarios).post(save_scenario))
        .route("/api/v1/scenarios/stats", get(scenario_stats))
        .route("/api/v1/scenarios/export", get(export_scenarios))
        .route("/api/v1/scenarios/import", post(import_scenarios))
        .route(
            "/api/v1/scenarios/:id",
            get(get_scenario).delete(delete_scenario),
        )
        .route("/api/v1/clusters", get(list_clusters))
        .route("/api/v1/clusters/analyze", post(analyze_clusters))
        .route("/api/v1/clusters/export", post(export_clusters))
        .route("/downloads/:filename", get(download_report))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
