//! Observability infrastructure for the simulator
//!
//! Provides:
//! - Prometheus metrics about the generator itself (latency, record counts,
//!   errors, history sizes)
//! - Structured JSON logging with tracing

use crate::models::{Incident, MetricSnapshot};
use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, GaugeVec, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// Histogram buckets for generation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
];

/// Record kinds used as metric labels
pub mod kinds {
    pub const METRICS: &str = "metrics";
    pub const INCIDENT: &str = "incident";
    pub const LOGS: &str = "logs";
}

/// History buffer names used as the `buffer` label
pub mod buffers {
    pub const METRICS: &str = "metrics";
    pub const INCIDENTS: &str = "incidents";
}

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SimulatorMetricsInner> = OnceLock::new();

struct SimulatorMetricsInner {
    generation_latency_seconds: HistogramVec,
    snapshots_generated: IntCounter,
    anomalies_flagged: IntCounter,
    incidents_simulated: IntCounterVec,
    log_entries_generated: IntCounter,
    generation_errors: IntCounterVec,
    history_entries: IntGaugeVec,
    build_info: GaugeVec,
}

impl SimulatorMetricsInner {
    fn new() -> Self {
        Self {
            generation_latency_seconds: register_histogram_vec!(
                "aiops_simulator_generation_latency_seconds",
                "Time spent generating one record",
                &["kind"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register generation_latency_seconds"),

            snapshots_generated: register_int_counter!(
                "aiops_simulator_snapshots_generated_total",
                "Total number of metric snapshots generated"
            )
            .expect("Failed to register snapshots_generated"),

            anomalies_flagged: register_int_counter!(
                "aiops_simulator_anomalies_flagged_total",
                "Total number of snapshots flagged as anomalous"
            )
            .expect("Failed to register anomalies_flagged"),

            incidents_simulated: register_int_counter_vec!(
                "aiops_simulator_incidents_simulated_total",
                "Total number of simulated incidents",
                &["severity"]
            )
            .expect("Failed to register incidents_simulated"),

            log_entries_generated: register_int_counter!(
                "aiops_simulator_log_entries_generated_total",
                "Total number of synthetic log entries generated"
            )
            .expect("Failed to register log_entries_generated"),

            generation_errors: register_int_counter_vec!(
                "aiops_simulator_generation_errors_total",
                "Total number of failed generation calls",
                &["kind", "error"]
            )
            .expect("Failed to register generation_errors"),

            history_entries: register_int_gauge_vec!(
                "aiops_simulator_history_entries",
                "Number of records held in each history buffer",
                &["buffer"]
            )
            .expect("Failed to register history_entries"),

            build_info: register_gauge_vec!(
                "aiops_simulator_build_info",
                "Simulator build information",
                &["version"]
            )
            .expect("Failed to register build_info"),
        }
    }
}

/// Simulator metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SimulatorMetrics {
    _private: (),
}

impl Default for SimulatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SimulatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SimulatorMetricsInner {
        GLOBAL_METRICS.get_or_init(SimulatorMetricsInner::new)
    }

    pub fn observe_generation_latency(&self, kind: &str, duration_secs: f64) {
        self.inner()
            .generation_latency_seconds
            .with_label_values(&[kind])
            .observe(duration_secs);
    }

    /// Count a snapshot and, when flagged, an anomaly
    pub fn record_snapshot(&self, snapshot: &MetricSnapshot) {
        self.inner().snapshots_generated.inc();
        if snapshot.anomaly_detection.has_anomaly {
            self.inner().anomalies_flagged.inc();
        }
    }

    pub fn record_incident(&self, incident: &Incident) {
        self.inner()
            .incidents_simulated
            .with_label_values(&[incident.severity.as_str()])
            .inc();
    }

    pub fn record_log_entries(&self, count: usize) {
        self.inner().log_entries_generated.inc_by(count as u64);
    }

    pub fn inc_generation_errors(&self, kind: &str, error: &str) {
        self.inner()
            .generation_errors
            .with_label_values(&[kind, error])
            .inc();
    }

    pub fn set_history_entries(&self, buffer: &str, entries: usize) {
        self.inner()
            .history_entries
            .with_label_values(&[buffer])
            .set(entries as i64);
    }

    pub fn set_build_info(&self, version: &str) {
        self.inner().build_info.reset();
        self.inner()
            .build_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

/// Structured logger for simulator events
///
/// Emits event-tagged records so the JSON log stream can be filtered by
/// `event` without parsing messages.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, port: u16, seeded: bool) {
        info!(
            event = "simulator_started",
            service = %self.service_name,
            version = %version,
            port = port,
            seeded = seeded,
            "AIOps simulator started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "simulator_shutdown",
            service = %self.service_name,
            reason = %reason,
            "AIOps simulator shutting down"
        );
    }

    pub fn log_snapshot(&self, snapshot: &MetricSnapshot) {
        info!(
            event = "metrics_generated",
            service = %self.service_name,
            overall_status = %snapshot.overall_status,
            anomaly_score = snapshot.anomaly_detection.anomaly_score,
            suspected_service = ?snapshot.anomaly_detection.suspected_service,
            "Generated metrics: {}",
            snapshot.overall_status
        );
    }

    pub fn log_incident(&self, incident: &Incident) {
        warn!(
            event = "incident_simulated",
            service = %self.service_name,
            incident_id = %incident.incident_id,
            incident_type = %incident.incident_type,
            severity = %incident.severity,
            affected_service = %incident.affected_service,
            "Simulated incident: {} - Severity: {}",
            incident.incident_type,
            incident.severity
        );
    }

    pub fn log_logs_sampled(&self, count: usize) {
        debug!(
            event = "logs_sampled",
            service = %self.service_name,
            count = count,
            "Generated sample log entries"
        );
    }

    pub fn log_generation_failure(&self, kind: &str, err: &dyn std::error::Error) {
        error!(
            event = "generation_failed",
            service = %self.service_name,
            kind = %kind,
            error = %err,
            "Error generating {}: {}",
            kind,
            err
        );
    }
}
