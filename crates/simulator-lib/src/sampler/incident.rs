//! Incident simulation
//!
//! Incidents are drawn from the closed [`IncidentType`] taxonomy. Five types
//! carry a dedicated content template; the rest share a generic one derived
//! from the type name.

use crate::error::{Result, SimulatorError};
use crate::models::{Incident, IncidentStatus, IncidentType, Severity};
use crate::random::{choose, weighted_choice, RandomSource};
use chrono::{DateTime, Duration, Utc};

/// Teams an incident can be routed to
pub const TEAMS: [&str; 3] = ["sre-team", "backend-team", "database-team"];

const SEVERITY_WEIGHTS: [(Severity, f64); 3] = [
    (Severity::Low, 0.5),
    (Severity::Medium, 0.35),
    (Severity::High, 0.15),
];

/// How long before detection the incident started, in minutes
const START_BACKOFF_MINUTES: (i64, i64) = (5, 60);

const INCIDENT_ID_RANGE: (i64, i64) = (10_000, 99_999);

const GENERIC_INDICATORS: &[&str] = &["monitoring_alert", "metric_anomaly", "user_report"];

const GENERIC_ACTIONS: &[&str] = &[
    "Review application logs",
    "Check system metrics",
    "Verify configuration",
    "Consult runbooks",
];

/// Rendered title, description and indicators for one incident
#[derive(Debug, Clone, PartialEq)]
struct IncidentContent {
    title: String,
    description: String,
    indicators: &'static [&'static str],
}

fn render_content(
    rng: &mut dyn RandomSource,
    incident_type: IncidentType,
    service: &str,
) -> IncidentContent {
    match incident_type {
        IncidentType::CpuSpike => IncidentContent {
            title: format!("CPU Spike detected in {}", service),
            description: format!(
                "CPU usage increased to {}% in {} pods",
                rng.int_range(85, 99),
                service
            ),
            indicators: &["high_cpu_usage", "increased_errors", "slow_response"],
        },
        IncidentType::MemoryLeak => IncidentContent {
            title: format!("Potential Memory Leak in {}", service),
            description: format!(
                "Memory usage growing steadily over time, currently at {}%",
                rng.int_range(88, 98)
            ),
            indicators: &["rising_memory", "increased_gc", "pod_restarts"],
        },
        IncidentType::HighLatency => IncidentContent {
            title: format!("High Latency detected for {}", service),
            description: format!("P95 latency increased to {}ms", rng.int_range(500, 2000)),
            indicators: &["slow_requests", "timeout_errors", "queue_backlog"],
        },
        IncidentType::ServiceOutage => IncidentContent {
            title: format!("Partial Outage: {}", service),
            description: format!(
                "{}% of {} pods are not responding",
                rng.int_range(30, 70),
                service
            ),
            indicators: &["high_error_rate", "zero_traffic", "health_check_fails"],
        },
        IncidentType::DatabaseSlowQueries => IncidentContent {
            title: "Database Performance Degradation".to_string(),
            description: format!(
                "Slow queries detected, avg query time: {}ms",
                rng.int_range(200, 1000)
            ),
            indicators: &["slow_queries", "connection_pool_exhausted", "lock_wait_time"],
        },
        other => IncidentContent {
            title: format!("{} detected", other.display_name()),
            description: format!("Incident of type {} affecting {}", other, service),
            indicators: GENERIC_INDICATORS,
        },
    }
}

/// Remediation steps for an incident type; never empty
pub fn suggested_actions(incident_type: IncidentType) -> &'static [&'static str] {
    match incident_type {
        IncidentType::CpuSpike => &[
            "Check pod resource limits",
            "Analyze recent code deployments",
            "Scale horizontally the affected service",
            "Review monitoring dashboards for correlation",
        ],
        IncidentType::MemoryLeak => &[
            "Analyze heap dumps",
            "Check for unbounded collections",
            "Review garbage collector logs",
            "Consider restarting affected pods",
        ],
        IncidentType::HighLatency => &[
            "Check downstream dependencies",
            "Review database query performance",
            "Analyze network metrics",
            "Check for rate limiting",
        ],
        IncidentType::ServiceOutage => &[
            "Check Kubernetes pod status",
            "Verify service configuration",
            "Check dependency health",
            "Review recent changes",
        ],
        IncidentType::DatabaseSlowQueries => &[
            "Check database load",
            "Review query execution plans",
            "Check for missing indexes",
            "Analyze lock contention",
        ],
        _ => GENERIC_ACTIONS,
    }
}

/// Lookup by type name; names outside the taxonomy get the generic list
pub fn suggested_actions_for(name: &str) -> &'static [&'static str] {
    match name.parse::<IncidentType>() {
        Ok(incident_type) => suggested_actions(incident_type),
        Err(_) => GENERIC_ACTIONS,
    }
}

/// Produces simulated [`Incident`]s
#[derive(Debug, Clone)]
pub struct IncidentSampler {
    services: Vec<String>,
}

impl IncidentSampler {
    /// Create a sampler affecting `services`; the list must not be empty
    pub fn new(services: Vec<String>) -> Result<Self> {
        if services.is_empty() {
            return Err(SimulatorError::configuration(
                "incident sampler needs at least one service",
            ));
        }
        Ok(Self { services })
    }

    /// Generate one incident detected at `now`
    pub fn simulate(&self, rng: &mut dyn RandomSource, now: DateTime<Utc>) -> Result<Incident> {
        let incident_type = *choose(rng, &IncidentType::ALL)
            .ok_or_else(|| SimulatorError::configuration("empty incident taxonomy"))?;
        let severity = weighted_choice(rng, &SEVERITY_WEIGHTS)?;
        let affected_service = choose(rng, &self.services)
            .ok_or_else(|| SimulatorError::configuration("no services to affect"))?
            .clone();

        let content = render_content(rng, incident_type, &affected_service);

        let backoff = rng.int_range(START_BACKOFF_MINUTES.0, START_BACKOFF_MINUTES.1);
        let incident_id = format!(
            "inc-{}",
            rng.int_range(INCIDENT_ID_RANGE.0, INCIDENT_ID_RANGE.1)
        );
        let assigned_team = choose(rng, &TEAMS)
            .ok_or_else(|| SimulatorError::configuration("empty team roster"))?
            .to_string();

        Ok(Incident {
            incident_id,
            incident_type,
            title: content.title,
            description: content.description,
            severity,
            affected_service,
            indicators: content.indicators.iter().map(|s| s.to_string()).collect(),
            detection_time: now,
            incident_start_time: now - Duration::minutes(backoff),
            status: IncidentStatus::Detected,
            assigned_team,
            priority: severity.priority(),
        })
    }
}
