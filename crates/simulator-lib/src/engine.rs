//! Telemetry engine
//!
//! Owns the samplers, the shared random source and both history buffers.
//! The serving layer constructs one engine and hands it to every request
//! handler; nothing here is global.

use crate::error::{Result, SimulatorError};
use crate::history::{
    HistoryBuffer, HistoryConfig, HistoryEntry, HistoryStats, INCIDENT_QUERY_CAP,
    METRICS_HISTORY_CAPACITY,
};
use crate::models::{
    default_fleet, Incident, IncidentStatus, LogEntry, MetricSnapshot, ServiceProfile, Severity,
};
use crate::random::{RandomSource, RngSource};
use crate::sampler::{suggested_actions, IncidentSampler, LogSampler, MetricSampler};
use chrono::Utc;
use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;

/// Default upper bound for one log sampling request
pub const MAX_LOG_BATCH: usize = 20;

/// Engine construction settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub profiles: Vec<ServiceProfile>,
    pub namespace: String,
    pub metrics_history: HistoryConfig,
    pub incident_history: HistoryConfig,
    pub max_log_batch: usize,
    /// Fixed seed for reproducible output; entropy-seeded when unset
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profiles: default_fleet(),
            namespace: "aiops-demo".to_string(),
            metrics_history: HistoryConfig::bounded(METRICS_HISTORY_CAPACITY),
            incident_history: HistoryConfig::unbounded(INCIDENT_QUERY_CAP),
            max_log_batch: MAX_LOG_BATCH,
            seed: None,
        }
    }
}

/// A window of recent history plus the clamped limit that produced it
#[derive(Debug, Clone)]
pub struct HistoryWindow<T> {
    pub limit: usize,
    pub entries: Vec<HistoryEntry<T>>,
}

/// Counts over the whole incident store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncidentSummary {
    pub total_incidents: usize,
    pub high_severity: usize,
    pub resolved: usize,
}

/// A freshly simulated incident and its remediation hints
#[derive(Debug, Clone)]
pub struct SimulatedIncident {
    pub incident: Incident,
    pub suggested_actions: Vec<String>,
}

pub struct TelemetryEngine {
    metric_sampler: MetricSampler,
    incident_sampler: IncidentSampler,
    log_sampler: LogSampler,
    rng: Mutex<Box<dyn RandomSource>>,
    metrics_history: RwLock<HistoryBuffer<MetricSnapshot>>,
    incident_history: RwLock<HistoryBuffer<Incident>>,
    max_log_batch: usize,
}

impl TelemetryEngine {
    /// Build an engine, seeding the random source from `config.seed` if set
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };
        Self::with_random_source(config, rng)
    }

    /// Build an engine drawing from `rng`
    pub fn with_random_source(config: EngineConfig, rng: Box<dyn RandomSource>) -> Result<Self> {
        let services: Vec<String> = config
            .profiles
            .iter()
            .map(|p| p.service_name.clone())
            .collect();

        Ok(Self {
            metric_sampler: MetricSampler::new(config.profiles)?,
            incident_sampler: IncidentSampler::new(services.clone())?,
            log_sampler: LogSampler::new(services, config.namespace)?,
            rng: Mutex::new(rng),
            metrics_history: RwLock::new(HistoryBuffer::new(config.metrics_history)),
            incident_history: RwLock::new(HistoryBuffer::new(config.incident_history)),
            max_log_batch: config.max_log_batch,
        })
    }

    /// Run `f` with exclusive access to the shared random source
    fn draw<T>(&self, f: impl FnOnce(&mut dyn RandomSource) -> Result<T>) -> Result<T> {
        let mut guard = self
            .rng
            .lock()
            .map_err(|_| SimulatorError::generation("random source lock poisoned"))?;
        f(&mut **guard)
    }

    /// Generate a snapshot and record it in the metrics history.
    ///
    /// The history write lock is held across generation, so entries are
    /// appended in timestamp order.
    pub async fn current_metrics(&self) -> Result<MetricSnapshot> {
        let mut history = self.metrics_history.write().await;
        let now = Utc::now();
        let snapshot = self.draw(|rng| self.metric_sampler.sample(rng, now))?;

        history.append(now, snapshot.clone());

        Ok(snapshot)
    }

    pub async fn metrics_history(&self, requested: i64) -> HistoryWindow<MetricSnapshot> {
        let history = self.metrics_history.read().await;
        let limit = history.clamp_limit(requested);

        HistoryWindow {
            limit,
            entries: history.recent(limit),
        }
    }

    /// Simulate an incident and record it in the incident history
    pub async fn simulate_incident(&self) -> Result<SimulatedIncident> {
        let mut history = self.incident_history.write().await;
        let now = Utc::now();
        let incident = self.draw(|rng| self.incident_sampler.simulate(rng, now))?;
        let suggested_actions = suggested_actions(incident.incident_type)
            .iter()
            .map(|s| s.to_string())
            .collect();

        history.append(now, incident.clone());

        Ok(SimulatedIncident {
            incident,
            suggested_actions,
        })
    }

    pub async fn incidents(&self, requested: i64) -> (HistoryWindow<Incident>, IncidentSummary) {
        let history = self.incident_history.read().await;
        let limit = history.clamp_limit(requested);

        let mut summary = IncidentSummary {
            total_incidents: history.len(),
            high_severity: 0,
            resolved: 0,
        };
        for entry in history.iter() {
            if entry.payload.severity == Severity::High {
                summary.high_severity += 1;
            }
            if entry.payload.status == IncidentStatus::Resolved {
                summary.resolved += 1;
            }
        }

        let window = HistoryWindow {
            limit,
            entries: history.recent(limit),
        };
        (window, summary)
    }

    /// Generate up to `max_log_batch` log entries; nothing is retained
    pub fn sample_logs(&self, requested: i64) -> Result<Vec<LogEntry>> {
        let count = requested.clamp(0, self.max_log_batch as i64) as usize;
        let now = Utc::now();

        let logs = self.draw(|rng| {
            (0..count)
                .map(|_| self.log_sampler.sample_log(rng, now))
                .collect::<Result<Vec<_>>>()
        })?;

        debug!(requested = requested, generated = logs.len(), "Sampled log entries");
        Ok(logs)
    }

    pub async fn metrics_history_stats(&self) -> HistoryStats {
        self.metrics_history.read().await.stats()
    }

    pub async fn incident_history_stats(&self) -> HistoryStats {
        self.incident_history.read().await.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncidentType;
    use std::sync::Arc;

    fn seeded_engine(seed: u64) -> TelemetryEngine {
        TelemetryEngine::new(EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
        .unwrap()
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

        fn weighted_index(&mut self, _weights: &[f64]) -> Result<usize> {
            Err(SimulatorError::configuration("weights unavailable"))
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.0.fill_bytes(dest)
        }
    }

    #[tokio::test]
    async fn test_current_metrics_is_recorded() {
        let engine = seeded_engine(1);
        let snapshot = engine.current_metrics().await.unwrap();

        let window = engine.metrics_history(20).await;
        assert_eq!(window.limit, 20);
        assert_eq!(window.entries.len(), 1);
        assert_eq!(window.entries[0].payload, snapshot);
        assert_eq!(window.entries[0].timestamp, snapshot.timestamp);
    }

    #[tokio::test]
    async fn test_metrics_history_evicts_past_capacity() {
        let engine = seeded_engine(2);
        let mut generated = Vec::new();
        for _ in 0..150 {
            generated.push(engine.current_metrics().await.unwrap());
        }

        let stats = engine.metrics_history_stats().await;
        assert_eq!(stats.entries, 100);

        let window = engine.metrics_history(1000).await;
        assert_eq!(window.limit, 100);
        assert_eq!(window.entries[0].payload, generated[50]);
        assert_eq!(window.entries[99].payload, generated[149]);
    }

    #[tokio::test]
    async fn test_incident_queries_are_capped() {
        let engine = seeded_engine(3);
        for _ in 0..60 {
            engine.simulate_incident().await.unwrap();
        }

        let (window, summary) = engine.incidents(200).await;
        assert_eq!(window.limit, 50);
        assert_eq!(window.entries.len(), 50);
        assert_eq!(summary.total_incidents, 60);
        assert_eq!(summary.resolved, 0);
        assert!(summary.high_severity <= 60);

        let (window, _) = engine.incidents(-3).await;
        assert_eq!(window.limit, 0);
        assert!(window.entries.is_empty());
    }

    #[tokio::test]
    async fn test_high_severity_summary_matches_store() {
        let engine = seeded_engine(4);
        let mut high = 0;
        for _ in 0..40 {
            let simulated = engine.simulate_incident().await.unwrap();
            if simulated.incident.severity == Severity::High {
                high += 1;
            }
        }

        let (_, summary) = engine.incidents(10).await;
        assert_eq!(summary.high_severity, high);
    }

    #[tokio::test]
    async fn test_simulated_incident_carries_actions() {
        let engine = seeded_engine(5);
        let simulated = engine.simulate_incident().await.unwrap();

        assert_eq!(simulated.suggested_actions.len(), 4);
        assert!(IncidentType::ALL.contains(&simulated.incident.incident_type));
    }

    #[tokio::test]
    async fn test_failed_generation_appends_nothing() {
        let engine = TelemetryEngine::with_random_source(
            EngineConfig::default(),
            Box::new(BrokenWeights(RngSource::seeded(6))),
        )
        .unwrap();

        let err = engine.simulate_incident().await.unwrap_err();
        assert!(matches!(err, SimulatorError::Configuration(_)));
        assert_eq!(engine.incident_history_stats().await.entries, 0);

        assert!(engine.sample_logs(3).is_err());
    }

    #[tokio::test]
    async fn test_seeded_engines_agree() {
        let a = seeded_engine(42);
        let b = seeded_engine(42);

        for _ in 0..5 {
            let x = a.current_metrics().await.unwrap();
            let y = b.current_metrics().await.unwrap();
            assert_eq!(x.services, y.services);
            assert_eq!(x.system_wide, y.system_wide);
            assert_eq!(x.anomaly_detection, y.anomaly_detection);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_generation_respects_capacity() {
        let engine = Arc::new(seeded_engine(8));

        let mut handles = Vec::new();
        for _ in 0..200 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.current_metrics().await.map(|_| ())
            }));
        }
        for _ in 0..60 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.simulate_incident().await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = engine.metrics_history_stats().await;
        assert_eq!(stats.entries, 100);
        assert_eq!(stats.total_appended, 200);
        assert_eq!(stats.evicted, 100);

        let window = engine.metrics_history(1000).await;
        assert_eq!(window.entries.len(), 100);
        assert!(window
            .entries
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));

        let (window, summary) = engine.incidents(200).await;
        assert_eq!(window.entries.len(), 50);
        assert_eq!(summary.total_incidents, 60);
        assert!(window
            .entries
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    }

    #[test]
    fn test_sample_logs_clamps_count() {
        let engine = seeded_engine(7);

        assert_eq!(engine.sample_logs(5).unwrap().len(), 5);
        assert_eq!(engine.sample_logs(25).unwrap().len(), 20);
        assert!(engine.sample_logs(-1).unwrap().is_empty());
    }

    #[test]
    fn test_empty_fleet_is_configuration_error() {
        let result = TelemetryEngine::new(EngineConfig {
            profiles: Vec::new(),
            ..EngineConfig::default()
        });
        assert!(matches!(result, Err(SimulatorError::Configuration(_))));
    }
}
