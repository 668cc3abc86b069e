//! Metric snapshot generation
//!
//! One fleet-wide `variation` is drawn per snapshot and applied to every
//! service's CPU so that baseline drift is correlated across the fleet. The
//! high-variance service may additionally receive a CPU/latency spike.

use crate::error::{Result, SimulatorError};
use crate::models::{
    AnomalyInfo, MetricSnapshot, OverallStatus, ServiceMetrics, ServiceProfile, SystemWide,
    HIGH_VARIANCE_SERVICE,
};
use crate::random::{choose, RandomSource};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Fleet-wide CPU drift range
const VARIATION_RANGE: (f64, f64) = (-15.0, 15.0);

const CPU_BOUNDS: (f64, f64) = (5.0, 95.0);
const MEMORY_BOUNDS: (f64, f64) = (10.0, 90.0);
const MEMORY_JITTER: f64 = 10.0;
const LATENCY_JITTER: f64 = 20.0;
const MIN_LATENCY_MS: f64 = 10.0;

const REQUEST_RATE_RANGE: (i64, i64) = (100, 1000);
const ERROR_RATE_RANGE: (f64, f64) = (0.1, 2.5);
const POD_COUNT_RANGE: (i64, i64) = (2, 5);
const ACTIVE_CONNECTIONS_RANGE: (i64, i64) = (500, 2000);

/// Probability that a snapshot is flagged anomalous
const ANOMALY_PROBABILITY: f64 = 0.25;

/// Upper bound of the background score reported when nothing is flagged
const BACKGROUND_SCORE_MAX: f64 = 0.3;

/// Spike injection applied to a single designated service
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeModel {
    pub service: String,
    pub probability: f64,
    pub cpu_range: (f64, f64),
    pub latency_range: (f64, f64),
}

impl Default for SpikeModel {
    fn default() -> Self {
        Self {
            service: HIGH_VARIANCE_SERVICE.to_string(),
            probability: 0.3,
            cpu_range: (20.0, 40.0),
            latency_range: (50.0, 150.0),
        }
    }
}

/// Produces [`MetricSnapshot`]s for a fixed fleet
#[derive(Debug, Clone)]
pub struct MetricSampler {
    profiles: Vec<ServiceProfile>,
    spike: SpikeModel,
    anomaly_probability: f64,
}

impl MetricSampler {
    /// Create a sampler for `profiles`; the fleet must not be empty
    pub fn new(profiles: Vec<ServiceProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(SimulatorError::configuration(
                "metric sampler needs at least one service profile",
            ));
        }

        Ok(Self {
            profiles,
            spike: SpikeModel::default(),
            anomaly_probability: ANOMALY_PROBABILITY,
        })
    }

    /// Replace the spike model
    pub fn with_spike(mut self, spike: SpikeModel) -> Self {
        self.spike = spike;
        self
    }

    /// Service names in fleet order
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.service_name.as_str())
    }

    /// Generate one snapshot stamped with `now`
    pub fn sample(&self, rng: &mut dyn RandomSource, now: DateTime<Utc>) -> Result<MetricSnapshot> {
        let variation = rng.uniform(VARIATION_RANGE.0, VARIATION_RANGE.1);

        let mut services = BTreeMap::new();
        let mut total_cpu = 0.0;
        let mut total_memory = 0.0;
        let mut total_latency = 0.0;
        let mut total_rps: u32 = 0;

        for profile in &self.profiles {
            let metrics = self.sample_service(rng, profile, variation);

            total_cpu += metrics.cpu_usage_percent;
            total_memory += metrics.memory_usage_percent;
            total_latency += metrics.latency_ms;
            total_rps += metrics.request_rate;

            services.insert(profile.service_name.clone(), metrics);
        }

        let count = self.profiles.len() as f64;
        let system_wide = SystemWide {
            avg_cpu_percent: round2(total_cpu / count),
            avg_memory_percent: round2(total_memory / count),
            avg_latency_ms: round2(total_latency / count),
            total_rps,
            active_connections: rng
                .int_range(ACTIVE_CONNECTIONS_RANGE.0, ACTIVE_CONNECTIONS_RANGE.1)
                as u32,
        };

        let anomaly_detection = self.sample_anomaly(rng)?;
        let overall_status = OverallStatus::from_anomaly(&anomaly_detection);

        Ok(MetricSnapshot {
            timestamp: now,
            services,
            system_wide,
            anomaly_detection,
            overall_status,
        })
    }

    fn sample_service(
        &self,
        rng: &mut dyn RandomSource,
        profile: &ServiceProfile,
        variation: f64,
    ) -> ServiceMetrics {
        let (cpu_spike, latency_spike) =
            if profile.service_name == self.spike.service && rng.chance(self.spike.probability) {
                (
                    rng.uniform(self.spike.cpu_range.0, self.spike.cpu_range.1),
                    rng.uniform(self.spike.latency_range.0, self.spike.latency_range.1),
                )
            } else {
                (0.0, 0.0)
            };

        let cpu = profile.base_cpu_percent + variation + cpu_spike;
        let memory = profile.base_memory_percent + rng.uniform(-MEMORY_JITTER, MEMORY_JITTER);
        let latency =
            profile.base_latency_ms + rng.uniform(-LATENCY_JITTER, LATENCY_JITTER) + latency_spike;

        ServiceMetrics {
            cpu_usage_percent: cpu.clamp(CPU_BOUNDS.0, CPU_BOUNDS.1),
            memory_usage_percent: memory.clamp(MEMORY_BOUNDS.0, MEMORY_BOUNDS.1),
            latency_ms: latency.max(MIN_LATENCY_MS),
            request_rate: rng.int_range(REQUEST_RATE_RANGE.0, REQUEST_RATE_RANGE.1) as u32,
            error_rate_percent: rng.uniform(ERROR_RATE_RANGE.0, ERROR_RATE_RANGE.1),
            pod_count: rng.int_range(POD_COUNT_RANGE.0, POD_COUNT_RANGE.1) as u32,
        }
    }

    /// Anomaly flag drawn independently of the service metrics
    fn sample_anomaly(&self, rng: &mut dyn RandomSource) -> Result<AnomalyInfo> {
        if !rng.chance(self.anomaly_probability) {
            return Ok(AnomalyInfo::clear(rng.uniform(0.0, BACKGROUND_SCORE_MAX)));
        }

        let score = rng.uniform(0.0, 1.0);
        let suspected = choose(rng, &self.profiles)
            .ok_or_else(|| SimulatorError::configuration("no services to suspect"))?;

        Ok(AnomalyInfo::detected(score, suspected.service_name.clone()))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
