//! Integration tests for the simulator API endpoints

use aiops_simulator::api::{create_router, AppState, Deployment};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use simulator_lib::{
    health::{components, HealthRegistry},
    random::{RandomSource, RngSource},
    EngineConfig, SimulatorError, SimulatorMetrics, TelemetryEngine,
};
use std::sync::Arc;
use tower::ServiceExt;

fn deployment() -> Deployment {
    Deployment {
        environment: "simulated-production".to_string(),
        cluster: "aks-aiops-dev".to_string(),
        namespace: "aiops-demo".to_string(),
    }
}

async fn app_with_engine(engine: TelemetryEngine) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::for_samplers().await;
    let metrics = SimulatorMetrics::new();
    let state = Arc::new(AppState::new(
        engine,
        health_registry,
        metrics,
        deployment(),
    ));
    let router = create_router(state.clone());

    (router, state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let engine = TelemetryEngine::new(EngineConfig {
        seed: Some(42),
        ..EngineConfig::default()
    })
    .unwrap();
    app_with_engine(engine).await
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri).await
}

async fn post(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri).await
}

/// Random source whose categorical draws always fail
struct BrokenWeights(RngSource<rand::rngs::StdRng>);

impl RandomSource for BrokenWeights {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.0.uniform(low, high)
    }

    fn int_range(&mut self, low: i64, high: i64) -> i64 {
        self.0.int_range(low, high)
    }

    fn weighted_index(&mut self, _weights: &[f64]) -> simulator_lib::Result<usize> {
        Err(SimulatorError::configuration("severity weights unavailable"))
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert!(body["endpoints"].is_object());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_service_and_components() {
    let (app, _state) = setup_test_app().await;

    let (status, health) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "aiops-simulator");
    assert_eq!(health["dependencies"]["database"], "simulated");
    assert!(health["components"][components::METRIC_SAMPLER].is_object());
    assert!(health["components"][components::INCIDENT_SAMPLER].is_object());
    assert!(health["components"][components::LOG_SAMPLER].is_object());
}

#[tokio::test]
async fn test_health_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_unhealthy(components::LOG_SAMPLER, "Template registry unavailable")
        .await;

    let (status, health) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let (app, state) = setup_test_app().await;

    let (status, readiness) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    state.health_registry.set_ready(true).await;

    let (status, readiness) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_current_metrics_shape() {
    let (app, _state) = setup_test_app().await;

    let (status, snapshot) = get(&app, "/metrics/current").await;

    assert_eq!(status, StatusCode::OK);
    let services = snapshot["services"].as_object().unwrap();
    assert_eq!(services.len(), 4);
    for name in [
        "api-gateway",
        "user-service",
        "payment-service",
        "notification-service",
    ] {
        let service = &services[name];
        let cpu = service["cpu_usage_percent"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&cpu));
        let pods = service["pod_count"].as_u64().unwrap();
        assert!((2..=5).contains(&pods));
        assert!(service["error_rate_percent"].is_number());
    }

    let system = &snapshot["system_wide"];
    assert!(system["avg_cpu_percent"].is_number());
    assert!(system["total_rps"].is_number());
    let connections = system["active_connections"].as_u64().unwrap();
    assert!((500..=2000).contains(&connections));

    let anomaly = &snapshot["anomaly_detection"];
    let has_anomaly = anomaly["has_anomaly"].as_bool().unwrap();
    let expected_status = if has_anomaly { "degraded" } else { "healthy" };
    assert_eq!(snapshot["overall_status"], expected_status);
    assert_eq!(anomaly["suspected_service"].is_string(), has_anomaly);
}

#[tokio::test]
async fn test_metrics_history_records_current_calls() {
    let (app, _state) = setup_test_app().await;

    let (_, empty) = get(&app, "/metrics/history").await;
    assert_eq!(empty["count"], 0);
    assert_eq!(empty["limit"], 20);

    for _ in 0..3 {
        get(&app, "/metrics/current").await;
    }

    let (status, history) = get(&app, "/metrics/history?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["count"], 2);
    assert_eq!(history["limit"], 2);
    let data = history["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["timestamp"], data[0]["metrics"]["timestamp"]);
}

#[tokio::test]
async fn test_metrics_history_limit_is_clamped() {
    let (app, _state) = setup_test_app().await;

    get(&app, "/metrics/current").await;

    let (_, history) = get(&app, "/metrics/history?limit=1000").await;
    assert_eq!(history["limit"], 100);
    assert_eq!(history["count"], 1);

    let (_, history) = get(&app, "/metrics/history?limit=-5").await;
    assert_eq!(history["limit"], 0);
    assert_eq!(history["count"], 0);
}

#[tokio::test]
async fn test_oversized_limits_are_clamped() {
    let (app, _state) = setup_test_app().await;

    get(&app, "/metrics/current").await;
    post(&app, "/incidents/simulate").await;

    let (status, history) = get(&app, "/metrics/history?limit=99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["limit"], 100);
    assert_eq!(history["count"], 1);

    let (status, incidents) = get(&app, "/incidents?limit=99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(incidents["limit"], 50);
    assert_eq!(incidents["count"], 1);

    let (status, logs) = get(&app, "/logs/sample?count=99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs["count"], 20);

    let (status, history) = get(&app, "/metrics/history?limit=-99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["limit"], 0);
    assert_eq!(history["count"], 0);
}

#[tokio::test]
async fn test_simulate_incident_response() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = post(&app, "/incidents/simulate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Incident simulated successfully");

    let incident = &body["incident"];
    assert!(incident["incident_id"].as_str().unwrap().starts_with("inc-"));
    assert_eq!(incident["status"], "detected");
    let expected_priority = match incident["severity"].as_str().unwrap() {
        "high" => "P1",
        "medium" => "P2",
        _ => "P3",
    };
    assert_eq!(incident["priority"], expected_priority);
    assert_eq!(body["suggested_actions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_simulate_requires_post() {
    let (app, _state) = setup_test_app().await;

    let (status, _) = get(&app, "/incidents/simulate").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_incidents_limit_and_summary() {
    let (app, _state) = setup_test_app().await;

    for _ in 0..60 {
        post(&app, "/incidents/simulate").await;
    }

    let (status, body) = get(&app, "/incidents?limit=200").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["count"], 50);
    assert_eq!(body["summary"]["total_incidents"], 60);
    assert_eq!(body["summary"]["resolved"], 0);

    let (_, body) = get(&app, "/incidents").await;
    assert_eq!(body["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_incident_actions_known_and_unknown() {
    let (app, _state) = setup_test_app().await;

    let (status, known) = get(&app, "/incidents/actions/high_cpu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(known["incident_type"], "high_cpu");
    assert_eq!(known["suggested_actions"].as_array().unwrap().len(), 4);

    let (status, unknown) = get(&app, "/incidents/actions/volcanic_eruption").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown["incident_type"], "volcanic_eruption");
    assert_eq!(unknown["suggested_actions"][0], "Review application logs");
}

#[tokio::test]
async fn test_logs_sample_count() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = get(&app, "/logs/sample").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);

    let log = &body["logs"][0];
    assert!(["INFO", "WARNING", "ERROR", "DEBUG"].contains(&log["level"].as_str().unwrap()));
    assert!(log["trace_id"].as_str().unwrap().starts_with("trace-"));
    assert_eq!(log["namespace"], "aiops-demo");
    assert!(!log["message"].as_str().unwrap().contains('{'));

    let (_, body) = get(&app, "/logs/sample?count=25").await;
    assert_eq!(body["count"], 20);

    let (_, body) = get(&app, "/logs/sample?count=0").await;
    assert_eq!(body["count"], 0);
    assert!(body["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_system_info_uses_deployment() {
    let (app, _state) = setup_test_app().await;

    let (status, info) = get(&app, "/system/info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["cluster"], "aks-aiops-dev");
    assert_eq!(info["namespace"], "aiops-demo");
    assert_eq!(info["services"].as_array().unwrap().len(), 4);
    assert_eq!(info["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_generation_failure_returns_detail() {
    let engine = TelemetryEngine::with_random_source(
        EngineConfig::default(),
        Box::new(BrokenWeights(RngSource::seeded(9))),
    )
    .unwrap();
    let (app, state) = app_with_engine(engine).await;

    let (status, body) = post(&app, "/incidents/simulate").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("severity weights unavailable"));

    // Nothing was recorded and the sampler shows as degraded
    let (_, incidents) = get(&app, "/incidents").await;
    assert_eq!(incidents["summary"]["total_incidents"], 0);

    let health = state.health_registry.health().await;
    assert_eq!(
        health.components[components::INCIDENT_SAMPLER].status,
        simulator_lib::ComponentStatus::Degraded
    );
}

#[tokio::test]
async fn test_internal_metrics_returns_prometheus_format() {
    let (app, _state) = setup_test_app().await;

    get(&app, "/metrics/current").await;
    post(&app, "/incidents/simulate").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/internal/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("aiops_simulator_snapshots_generated_total"));
    assert!(metrics_text.contains("aiops_simulator_incidents_simulated_total"));
    assert!(metrics_text.contains("aiops_simulator_generation_latency_seconds_bucket"));
    assert!(metrics_text.contains(r#"aiops_simulator_history_entries{buffer="metrics"}"#));
    assert!(metrics_text.contains(r#"aiops_simulator_history_entries{buffer="incidents"}"#));
}
