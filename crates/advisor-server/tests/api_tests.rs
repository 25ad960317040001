//! Integration tests for the advisor API endpoints

use advisor_lib::{
    catalog::Catalog,
    cloud::{ClusterDetails, ClusterSource, ClusterSummary, StaticClusterSource, WorkerRecord},
    cluster::{AnalyzerConfig, ClusterAnalyzer},
    health::{components, HealthRegistry},
    observability::{AdvisorMetrics, StructuredLogger},
    report::XlsxReportSink,
    scenario::{MemoryBackend, ScenarioStore},
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sizing_advisor::api::{create_router, AppState};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _report_dir: TempDir,
}

fn cluster(id: &str, flavor: &str, workers: usize) -> ClusterDetails {
    ClusterDetails {
        cluster: ClusterSummary {
            id: id.to_string(),
            name: format!("{}-name", id),
            state: Some("normal".to_string()),
            created_date: Some("2024-01-01T00:00:00+0000".to_string()),
            ..Default::default()
        },
        workers: (0..workers)
            .map(|i| WorkerRecord {
                id: format!("{}-w{}", id, i),
                flavor: Some(flavor.to_string()),
                zone: Some("dal10".to_string()),
                ..Default::default()
            })
            .collect(),
    }
}

async fn setup_test_app(cluster_source: Option<Arc<dyn ClusterSource>>) -> TestApp {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::CATALOG).await;
    health_registry.register(components::SCENARIO_STORE).await;
    health_registry.register(components::CLOUD_SOURCE).await;
    if cluster_source.is_none() {
        health_registry
            .set_not_configured(components::CLOUD_SOURCE, "IBM Cloud service not configured")
            .await;
    }

    let catalog = Catalog::embedded().unwrap();
    let report_dir = TempDir::new().unwrap();
    let analyzer = ClusterAnalyzer::new(catalog.cloud_pricing.clone(), AnalyzerConfig::default());

    let state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        scenarios: Arc::new(RwLock::new(ScenarioStore::open(MemoryBackend::new()))),
        cluster_source,
        analyzer,
        report_sink: Arc::new(XlsxReportSink::new(report_dir.path())),
        report_dir: report_dir.path().to_path_buf(),
        health_registry,
        metrics: AdvisorMetrics::new(),
        logger: StructuredLogger::new("api-test"),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        _report_dir: report_dir,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn send_json(app: &TestApp, method: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_healthz_ok_without_cloud_credentials() {
    let app = setup_test_app(None).await;

    let (status, health) = get_json(&app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(
        health["components"]["cloud_source"]["status"],
        "not_configured"
    );
}

#[tokio::test]
async fn test_healthz_returns_unavailable_when_unhealthy() {
    let app = setup_test_app(None).await;
    app.state
        .health_registry
        .set_unhealthy(components::SCENARIO_STORE, "disk gone")
        .await;

    let (status, health) = get_json(&app, "/healthz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_registry() {
    let app = setup_test_app(None).await;

    let (status, _) = get_json(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.state.health_registry.set_ready(true).await;
    let (status, readiness) = get_json(&app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_advisor_metrics() {
    let app = setup_test_app(None).await;
    app.state.metrics.inc_estimates_computed();

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("sizing_advisor_estimates_computed_total"));
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = setup_test_app(None).await;

    let (status, baselines) = get_json(&app, "/api/v1/baselines").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(baselines.as_array().unwrap().len(), 6);

    let (status, baseline) = get_json(&app, "/api/v1/baselines/config-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(baseline["workers"], 3);

    let (status, error) = get_json(&app, "/api/v1/baselines/config-99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "not_found");

    let (status, dense) = get_json(&app, "/api/v1/flavors?series=bx3d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dense.as_array().unwrap().len(), 20);

    let (status, _) = get_json(&app, "/api/v1/flavors?series=cx9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, flavor) = get_json(&app, "/api/v1/flavors/bx2.16x32").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flavor["id"], "bx2-16x32");

    let (status, suggestions) = get_json(&app, "/api/v1/baselines/config-1/flavors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(suggestions[0]["priority"], "high");
    assert!(suggestions[0]["flavor"].is_object());
}

#[tokio::test]
async fn test_estimate_for_catalog_baseline() {
    let app = setup_test_app(None).await;

    let (status, result) = send_json(
        &app,
        "POST",
        "/api/v1/estimate",
        json!({"baseline_id": "config-1", "flavor_id": "bx2-16x32", "zones": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["costs"]["total_nodes"], 6);
    assert!(result["score"]["level"].is_string());
    assert!(result["recommendations"].as_array().is_some());
}

#[tokio::test]
async fn test_estimate_rejects_bad_input() {
    let app = setup_test_app(None).await;

    let (status, error) = send_json(
        &app,
        "POST",
        "/api/v1/estimate",
        json!({"baseline_id": "config-1", "flavor_id": "bx2-16x32", "zones": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "bad_request");

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/v1/estimate",
        json!({"flavor_id": "bx2-16x32", "zones": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/v1/estimate",
        json!({
            "baseline": {"workers": 0, "vcpu": 8, "ram_gb": 32, "disk_gb": 100},
            "flavor_id": "bx2-16x32",
            "zones": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_zones_return_json_bad_request() {
    let app = setup_test_app(None).await;

    for zones in [json!(300), json!("two"), json!(-1)] {
        let (status, error) = send_json(
            &app,
            "POST",
            "/api/v1/estimate",
            json!({"baseline_id": "config-1", "flavor_id": "bx2-16x32", "zones": zones}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "zones {}", zones);
        assert_eq!(error["code"], "bad_request");
    }

    let (status, error) = send_json(
        &app,
        "POST",
        "/api/v1/scenarios",
        json!({"name": "bad", "baseline_id": "config-1", "flavor_id": "bx2-16x32", "zones": "two"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "bad_request");
}

#[tokio::test]
async fn test_estimate_with_huge_custom_worker_count() {
    let app = setup_test_app(None).await;

    let (status, result) = send_json(
        &app,
        "POST",
        "/api/v1/estimate",
        json!({
            "baseline": {"workers": 2000000000u32, "vcpu": 16, "ram_gb": 32, "disk_gb": 100},
            "flavor_id": "bx2-16x32",
            "zones": 3
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["costs"]["total_nodes"], 6_000_000_000u64);
}

#[tokio::test]
async fn test_estimate_for_custom_baseline() {
    let app = setup_test_app(None).await;

    let (status, result) = send_json(
        &app,
        "POST",
        "/api/v1/estimate",
        json!({
            "baseline": {"name": "Edge", "workers": 2, "vcpu": 8, "ram_gb": 32, "disk_gb": 100},
            "flavor_id": "bx2-16x32",
            "zones": 3
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["costs"]["total_nodes"], 6);
}

#[tokio::test]
async fn test_scenario_lifecycle() {
    let app = setup_test_app(None).await;

    let (status, saved) = send_json(
        &app,
        "POST",
        "/api/v1/scenarios",
        json!({
            "name": "Plant rollout",
            "notes": "phase one",
            "baseline_id": "config-1",
            "flavor_id": "bx2-16x32",
            "zones": 2
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["success"], true);
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, listed) = get_json(&app, "/api/v1/scenarios?q=plant").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, scenario) = get_json(&app, &format!("/api/v1/scenarios/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scenario["name"], "Plant rollout");
    assert_eq!(scenario["zones"], 2);

    let (status, stats) = get_json(&app, "/api/v1/scenarios/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_scenarios"], 1);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/scenarios/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&app, &format!("/api/v1/scenarios/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scenario_requires_name() {
    let app = setup_test_app(None).await;

    let (status, error) = send_json(
        &app,
        "POST",
        "/api/v1/scenarios",
        json!({"name": "  ", "baseline_id": "config-1", "flavor_id": "bx2-16x32", "zones": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Scenario name is required");
}

#[tokio::test]
async fn test_scenario_export_and_import() {
    let app = setup_test_app(None).await;
    send_json(
        &app,
        "POST",
        "/api/v1/scenarios",
        json!({"name": "Exported", "baseline_id": "config-1", "flavor_id": "bx2-16x32", "zones": 1}),
    )
    .await;

    let request = Request::builder()
        .uri("/api/v1/scenarios/export")
        .body(Body::empty())
        .unwrap();
    let (status, exported) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/scenarios/import")
        .body(Body::from(exported))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcome["imported_count"], 1);

    let (_, listed) = get_json(&app, "/api/v1/scenarios").await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/scenarios/import")
        .body(Body::from("not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cluster_endpoints_unavailable_without_credentials() {
    let app = setup_test_app(None).await;

    let (status, error) = get_json(&app, "/api/v1/clusters").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["code"], "not_configured");

    let (status, _) = send_json(&app, "POST", "/api/v1/clusters/analyze", Value::Null).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Costing keeps working
    let (status, _) = get_json(&app, "/api/v1/baselines").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cluster_analysis_excludes_failed_clusters() {
    let source = StaticClusterSource::new(vec![
        cluster("small", "bx2.4x16", 3),
        cluster("big", "bx3d.16x64", 9),
    ])
    .fail(
        ClusterSummary {
            id: "broken".into(),
            name: "broken".into(),
            ..Default::default()
        },
        "detail fetch timed out",
    );
    let app = setup_test_app(Some(Arc::new(source))).await;

    let (status, clusters) = get_json(&app, "/api/v1/clusters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clusters.as_array().unwrap().len(), 3);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/clusters/analyze")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let aggregate: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(aggregate["total_clusters"], 2);
    assert_eq!(aggregate["total_workers"], 12);
    assert_eq!(aggregate["failed"].as_array().unwrap().len(), 1);
    assert_eq!(aggregate["clusters"][0]["id"], "small");
}

#[tokio::test]
async fn test_cluster_export_writes_downloadable_report() {
    let source = StaticClusterSource::new(vec![cluster("prod", "bx3d.16x64", 3)]);
    let app = setup_test_app(Some(Arc::new(source))).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/clusters/export")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["total_clusters"], 1);
    let filename = report["filename"].as_str().unwrap();
    assert!(filename.starts_with("ibm-cloud-cluster-analysis-"));

    let request = Request::builder()
        .uri(report["url"].as_str().unwrap())
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..2], b"PK");

    let (status, _) = get_json(&app, "/downloads/missing.xlsx").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cluster_export_accepts_posted_aggregate() {
    let app = setup_test_app(None).await;

    let aggregate = json!({
        "total_clusters": 0,
        "total_workers": 0,
        "total_monthly_cost": 0.0,
        "total_yearly_cost": 0.0,
        "total_cost_to_date": 0.0,
        "score_counts": {"green": 0, "amber": 0, "red": 0, "unpriced": 0},
        "clusters": [],
        "generated_at": "2024-03-01T00:00:00Z"
    });
    let (status, report) = send_json(&app, "POST", "/api/v1/clusters/export", aggregate).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report["filename"],
        "ibm-cloud-cluster-analysis-2024-03-01.xlsx"
    );

    let (status, _) = send_json(&app, "POST", "/api/v1/clusters/export", json!({"bad": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
