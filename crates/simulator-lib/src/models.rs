//! Core data models for the telemetry simulator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Service that receives correlated CPU/latency spikes
pub const HIGH_VARIANCE_SERVICE: &str = "payment-service";

/// Static per-service baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProfile {
    pub service_name: String,
    pub base_cpu_percent: f64,
    pub base_memory_percent: f64,
    pub base_latency_ms: f64,
}

impl ServiceProfile {
    pub fn new(
        service_name: impl Into<String>,
        base_cpu_percent: f64,
        base_memory_percent: f64,
        base_latency_ms: f64,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            base_cpu_percent,
            base_memory_percent,
            base_latency_ms,
        }
    }
}

/// The simulated fleet
pub fn default_fleet() -> Vec<ServiceProfile> {
    vec![
        ServiceProfile::new("api-gateway", 40.0, 60.0, 50.0),
        ServiceProfile::new("user-service", 30.0, 50.0, 30.0),
        ServiceProfile::new(HIGH_VARIANCE_SERVICE, 60.0, 70.0, 100.0),
        ServiceProfile::new("notification-service", 25.0, 40.0, 20.0),
    ]
}

/// Metrics for a single service in one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    pub latency_ms: f64,
    pub request_rate: u32,
    pub error_rate_percent: f64,
    pub pod_count: u32,
}

/// Fleet-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemWide {
    pub avg_cpu_percent: f64,
    pub avg_memory_percent: f64,
    pub avg_latency_ms: f64,
    pub total_rps: u32,
    pub active_connections: u32,
}

/// Result of the simulated anomaly detector.
///
/// `suspected_service` is present exactly when `has_anomaly` is true; use the
/// constructors to keep the two fields in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyInfo {
    pub has_anomaly: bool,
    pub anomaly_score: f64,
    pub suspected_service: Option<String>,
}

impl AnomalyInfo {
    pub fn detected(anomaly_score: f64, suspected_service: impl Into<String>) -> Self {
        Self {
            has_anomaly: true,
            anomaly_score,
            suspected_service: Some(suspected_service.into()),
        }
    }

    pub fn clear(anomaly_score: f64) -> Self {
        Self {
            has_anomaly: false,
            anomaly_score,
            suspected_service: None,
        }
    }
}

/// Overall fleet status derived from the anomaly flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

impl OverallStatus {
    pub fn from_anomaly(anomaly: &AnomalyInfo) -> Self {
        if anomaly.has_anomaly {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metric generation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<String, ServiceMetrics>,
    pub system_wide: SystemWide,
    pub anomaly_detection: AnomalyInfo,
    pub overall_status: OverallStatus,
}

/// Closed taxonomy of simulated incidents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    CpuSpike,
    MemoryLeak,
    HighLatency,
    ServiceOutage,
    DatabaseSlowQueries,
    NetworkPartition,
    DiskIoBottleneck,
    ApiRateLimit,
    CacheMissStorm,
    DependencyFailure,
}

impl IncidentType {
    pub const ALL: [IncidentType; 10] = [
        IncidentType::CpuSpike,
        IncidentType::MemoryLeak,
        IncidentType::HighLatency,
        IncidentType::ServiceOutage,
        IncidentType::DatabaseSlowQueries,
        IncidentType::NetworkPartition,
        IncidentType::DiskIoBottleneck,
        IncidentType::ApiRateLimit,
        IncidentType::CacheMissStorm,
        IncidentType::DependencyFailure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::CpuSpike => "cpu_spike",
            IncidentType::MemoryLeak => "memory_leak",
            IncidentType::HighLatency => "high_latency",
            IncidentType::ServiceOutage => "service_outage",
            IncidentType::DatabaseSlowQueries => "database_slow_queries",
            IncidentType::NetworkPartition => "network_partition",
            IncidentType::DiskIoBottleneck => "disk_io_bottleneck",
            IncidentType::ApiRateLimit => "api_rate_limit",
            IncidentType::CacheMissStorm => "cache_miss_storm",
            IncidentType::DependencyFailure => "dependency_failure",
        }
    }

    /// Human-readable name: `disk_io_bottleneck` becomes `Disk Io Bottleneck`
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown incident type: {}", s))
    }
}

/// Incident severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Fixed severity to priority table
    pub fn priority(&self) -> Priority {
        match self {
            Severity::Low => Priority::P3,
            Severity::Medium => Priority::P2,
            Severity::High => Priority::P1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational priority code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
}

/// Incident lifecycle state. Generated incidents always start as `Detected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Detected,
    Investigating,
    Resolved,
}

/// One simulated incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    pub incident_type: IncidentType,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub affected_service: String,
    pub indicators: Vec<String>,
    pub detection_time: DateTime<Utc>,
    pub incident_start_time: DateTime<Utc>,
    pub status: IncidentStatus,
    pub assigned_team: String,
    pub priority: Priority,
}

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthetic structured log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub service: String,
    pub trace_id: String,
    pub span_id: String,
    pub host: String,
    pub namespace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_table() {
        assert_eq!(Severity::Low.priority(), Priority::P3);
        assert_eq!(Severity::Medium.priority(), Priority::P2);
        assert_eq!(Severity::High.priority(), Priority::P1);
    }

    #[test]
    fn test_incident_type_round_trips_through_name() {
        for t in IncidentType::ALL {
            assert_eq!(t.as_str().parse::<IncidentType>().unwrap(), t);
            assert_eq!(
                serde_json::to_value(t).unwrap(),
                serde_json::Value::String(t.as_str().to_string())
            );
        }
        assert!("disk_full".parse::<IncidentType>().is_err());
    }

    #[test]
    fn test_display_name_title_cases_words() {
        assert_eq!(IncidentType::NetworkPartition.display_name(), "Network Partition");
        assert_eq!(IncidentType::DiskIoBottleneck.display_name(), "Disk Io Bottleneck");
    }

    #[test]
    fn test_overall_status_follows_anomaly() {
        assert_eq!(
            OverallStatus::from_anomaly(&AnomalyInfo::detected(0.9, "api-gateway")),
            OverallStatus::Degraded
        );
        assert_eq!(
            OverallStatus::from_anomaly(&AnomalyInfo::clear(0.1)),
            OverallStatus::Healthy
        );
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(Priority::P1).unwrap(), "P1");
        assert_eq!(serde_json::to_value(LogLevel::Warning).unwrap(), "WARNING");
        assert_eq!(serde_json::to_value(IncidentStatus::Detected).unwrap(), "detected");

        let clear = serde_json::to_value(AnomalyInfo::clear(0.2)).unwrap();
        assert!(clear["suspected_service"].is_null());
    }

    #[test]
    fn test_default_fleet_contains_spike_target() {
        let fleet = default_fleet();
        assert_eq!(fleet.len(), 4);
        assert!(fleet.iter().any(|p| p.service_name == HIGH_VARIANCE_SERVICE));
    }
}
