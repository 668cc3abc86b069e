//! HTTP API exposing the telemetry generators

use crate::config::SimulatorConfig;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, TextEncoder};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;
use simulator_lib::{
    health::{components, ComponentHealth, ComponentStatus, HealthRegistry},
    observability::{buffers, kinds, SimulatorMetrics, StructuredLogger},
    sampler::suggested_actions_for,
    Incident, IncidentSummary, LogEntry, MetricSnapshot, SimulatorError, SystemInfo,
    TelemetryEngine,
};
use std::collections::HashMap;
use std::num::IntErrorKind;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const SERVICE_NAME: &str = "aiops-simulator";
pub const APPLICATION_NAME: &str = "AIOps Metrics Simulator";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const DEFAULT_INCIDENT_LIMIT: i64 = 10;
const DEFAULT_LOG_COUNT: i64 = 5;

/// Cluster identity reported by the informational endpoints
#[derive(Debug, Clone)]
pub struct Deployment {
    pub environment: String,
    pub cluster: String,
    pub namespace: String,
}

impl From<&SimulatorConfig> for Deployment {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            environment: config.environment.clone(),
            cluster: config.cluster_name.clone(),
            namespace: config.namespace.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub engine: TelemetryEngine,
    pub health_registry: HealthRegistry,
    pub metrics: SimulatorMetrics,
    pub logger: StructuredLogger,
    pub deployment: Deployment,
}

impl AppState {
    pub fn new(
        engine: TelemetryEngine,
        health_registry: HealthRegistry,
        metrics: SimulatorMetrics,
        deployment: Deployment,
    ) -> Self {
        Self {
            engine,
            health_registry,
            metrics,
            logger: StructuredLogger::new(SERVICE_NAME),
            deployment,
        }
    }

    /// Record latency, component health and failures for one generation call
    async fn observe<T>(
        &self,
        component: &str,
        kind: &str,
        started: Instant,
        result: &Result<T, SimulatorError>,
    ) {
        self.metrics
            .observe_generation_latency(kind, started.elapsed().as_secs_f64());

        match result {
            Ok(_) => {
                self.health_registry
                    .record_outcome::<&str>(component, Ok(()))
                    .await
            }
            Err(e) => {
                self.metrics.inc_generation_errors(kind, e.kind());
                self.logger.log_generation_failure(kind, e);
                self.health_registry.record_outcome(component, Err(e)).await;
            }
        }
    }
}

/// Error response in the `{"detail": ...}` shape
#[derive(Debug)]
pub struct ApiError(SimulatorError);

impl From<SimulatorError> for ApiError {
    fn from(err: SimulatorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self.0 {
            SimulatorError::Configuration(_) => self.0.to_string(),
            SimulatorError::Generation(_) => "Internal generation failure".to_string(),
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default, deserialize_with = "saturating_int")]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    #[serde(default, deserialize_with = "saturating_int")]
    pub count: Option<i64>,
}

/// Parse an integer query value, saturating out-of-range values so the
/// clamp downstream still applies
fn saturating_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<i64>() {
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
            IntErrorKind::NegOverflow => Ok(Some(i64::MIN)),
            _ => Err(de::Error::custom(format!("invalid integer {:?}: {}", raw, e))),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub dependencies: HashMap<&'static str, &'static str>,
    pub components: HashMap<String, ComponentHealth>,
}

#[derive(Debug, Serialize)]
pub struct MetricsHistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub metrics: MetricSnapshot,
}

#[derive(Debug, Serialize)]
pub struct MetricsHistoryResponse {
    pub count: usize,
    pub limit: usize,
    pub data: Vec<MetricsHistoryRecord>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SimulateIncidentResponse {
    pub message: &'static str,
    pub incident: Incident,
    pub suggested_actions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct IncidentRecord {
    pub timestamp: DateTime<Utc>,
    pub incident: Incident,
}

#[derive(Debug, Serialize)]
pub struct IncidentsResponse {
    pub count: usize,
    pub limit: usize,
    pub data: Vec<IncidentRecord>,
    pub summary: IncidentSummary,
}

#[derive(Debug, Serialize)]
pub struct SuggestedActionsResponse {
    pub incident_type: String,
    pub suggested_actions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub count: usize,
    pub logs: Vec<LogEntry>,
    pub timestamp: DateTime<Utc>,
}

/// Application banner
async fn root() -> impl IntoResponse {
    Json(json!({
        "application": APPLICATION_NAME,
        "version": VERSION,
        "status": "operational",
        "description": "Metrics and incident simulator for AIOps demonstrations",
        "endpoints": {
            "health": "/health - Health check",
            "metrics": "/metrics/current - Current metrics",
            "metrics_history": "/metrics/history - Metrics history",
            "simulate_incident": "/incidents/simulate - Simulate an incident",
            "incidents": "/incidents - Simulated incidents",
            "logs": "/logs/sample - Sample application logs",
            "system_info": "/system/info - Simulated system info"
        },
        "timestamp": Utc::now(),
    }))
}

/// Health check - returns 200 if healthy or degraded, 503 if unhealthy
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health_registry.health().await;

    let status_code = if report.status.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let dependencies = HashMap::from([
        ("database", "simulated"),
        ("cache", "simulated"),
        ("external_apis", "simulated"),
    ]);

    (
        status_code,
        Json(HealthResponse {
            status: report.status,
            service: SERVICE_NAME,
            timestamp: Utc::now(),
            uptime_seconds: state.health_registry.uptime_seconds(),
            dependencies,
            components: report.components,
        }),
    )
}

/// Readiness check - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics about the simulator process
async fn prometheus_metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {}", e),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn current_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricSnapshot>, ApiError> {
    let started = Instant::now();
    let result = state.engine.current_metrics().await;
    state
        .observe(components::METRIC_SAMPLER, kinds::METRICS, started, &result)
        .await;
    let snapshot = result?;

    state.metrics.record_snapshot(&snapshot);
    state.logger.log_snapshot(&snapshot);
    let stats = state.engine.metrics_history_stats().await;
    state.metrics.set_history_entries(buffers::METRICS, stats.entries);

    Ok(Json(snapshot))
}

async fn metrics_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<MetricsHistoryResponse> {
    let window = state
        .engine
        .metrics_history(query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await;

    let data: Vec<MetricsHistoryRecord> = window
        .entries
        .into_iter()
        .map(|entry| MetricsHistoryRecord {
            timestamp: entry.timestamp,
            metrics: entry.payload,
        })
        .collect();

    Json(MetricsHistoryResponse {
        count: data.len(),
        limit: window.limit,
        data,
        timestamp: Utc::now(),
    })
}

async fn simulate_incident(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SimulateIncidentResponse>, ApiError> {
    let started = Instant::now();
    let result = state.engine.simulate_incident().await;
    state
        .observe(components::INCIDENT_SAMPLER, kinds::INCIDENT, started, &result)
        .await;
    let simulated = result?;

    state.metrics.record_incident(&simulated.incident);
    state.logger.log_incident(&simulated.incident);
    let stats = state.engine.incident_history_stats().await;
    state.metrics.set_history_entries(buffers::INCIDENTS, stats.entries);

    Ok(Json(SimulateIncidentResponse {
        message: "Incident simulated successfully",
        incident: simulated.incident,
        suggested_actions: simulated.suggested_actions,
        timestamp: Utc::now(),
    }))
}

async fn list_incidents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<IncidentsResponse> {
    let (window, summary) = state
        .engine
        .incidents(query.limit.unwrap_or(DEFAULT_INCIDENT_LIMIT))
        .await;

    let data: Vec<IncidentRecord> = window
        .entries
        .into_iter()
        .map(|entry| IncidentRecord {
            timestamp: entry.timestamp,
            incident: entry.payload,
        })
        .collect();

    Json(IncidentsResponse {
        count: data.len(),
        limit: window.limit,
        data,
        summary,
    })
}

async fn incident_actions(Path(incident_type): Path<String>) -> Json<SuggestedActionsResponse> {
    let suggested_actions = suggested_actions_for(&incident_type).to_vec();
    Json(SuggestedActionsResponse {
        incident_type,
        suggested_actions,
    })
}

async fn sample_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let started = Instant::now();
    let result = state
        .engine
        .sample_logs(query.count.unwrap_or(DEFAULT_LOG_COUNT));
    state
        .observe(components::LOG_SAMPLER, kinds::LOGS, started, &result)
        .await;
    let logs = result?;

    state.metrics.record_log_entries(logs.len());
    state.logger.log_logs_sampled(logs.len());

    Ok(Json(LogsResponse {
        count: logs.len(),
        logs,
        timestamp: Utc::now(),
    }))
}

async fn system_info(State(state): State<Arc<AppState>>) -> Json<SystemInfo> {
    let deployment = &state.deployment;
    Json(SystemInfo::simulated(
        &deployment.environment,
        &deployment.cluster,
        &deployment.namespace,
        Utc::now(),
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/readyz", get(readyz))
        .route("/internal/metrics", get(prometheus_metrics))
        .route("/metrics/current", get(current_metrics))
        .route("/metrics/history", get(metrics_history))
        .route("/incidents", get(list_incidents))
        .route("/incidents/simulate", post(simulate_incident))
        .route("/incidents/actions/:incident_type", get(incident_actions))
        .route("/logs/sample", get(sample_logs))
        .route("/system/info", get(system_info))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
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
