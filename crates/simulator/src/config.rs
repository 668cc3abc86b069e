//! Simulator configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use simulator_lib::history::METRICS_HISTORY_CAPACITY;
use simulator_lib::{EngineConfig, HistoryConfig};
use std::collections::HashMap;

/// Environment variable prefix, e.g. `SIMULATOR_API_PORT`
const ENV_PREFIX: &str = "SIMULATOR";

/// Simulator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Namespace stamped on generated log entries
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    /// Stored metric snapshots; queries stay capped at 100
    #[serde(default = "default_metrics_history_capacity")]
    pub metrics_history_capacity: usize,

    /// Stored incidents; unset keeps every incident
    #[serde(default)]
    pub incident_history_capacity: Option<usize>,

    /// Maximum incidents returned per query
    #[serde(default = "default_incident_query_cap")]
    pub incident_query_cap: usize,

    /// Maximum log entries per sampling request
    #[serde(default = "default_max_log_batch")]
    pub max_log_batch: usize,

    /// Fixed seed for reproducible output
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_api_port() -> u16 {
    8000
}

fn default_namespace() -> String {
    "aiops-demo".to_string()
}

fn default_cluster_name() -> String {
    "aks-aiops-dev".to_string()
}

fn default_environment() -> String {
    "simulated-production".to_string()
}

fn default_metrics_history_capacity() -> usize {
    METRICS_HISTORY_CAPACITY
}

fn default_incident_query_cap() -> usize {
    simulator_lib::history::INCIDENT_QUERY_CAP
}

fn default_max_log_batch() -> usize {
    simulator_lib::engine::MAX_LOG_BATCH
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            namespace: default_namespace(),
            cluster_name: default_cluster_name(),
            environment: default_environment(),
            metrics_history_capacity: default_metrics_history_capacity(),
            incident_history_capacity: None,
            incident_query_cap: default_incident_query_cap(),
            max_log_batch: default_max_log_batch(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from `SIMULATOR_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read simulator configuration")?;

        config
            .try_deserialize()
            .context("Invalid simulator configuration")
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        let incident_history = match self.incident_history_capacity {
            Some(capacity) => {
                HistoryConfig::bounded_with_query_cap(capacity, self.incident_query_cap)
            }
            None => HistoryConfig::unbounded(self.incident_query_cap),
        };

        EngineConfig {
            namespace: self.namespace.clone(),
            metrics_history: HistoryConfig::bounded_with_query_cap(
                self.metrics_history_capacity,
                METRICS_HISTORY_CAPACITY,
            ),
            incident_history,
            max_log_batch: self.max_log_batch,
            seed: self.seed,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = SimulatorConfig::from_vars(HashMap::new()).unwrap();

        assert_eq!(config.api_port, 8000);
        assert_eq!(config.namespace, "aiops-demo");
        assert_eq!(config.metrics_history_capacity, 100);
        assert_eq!(config.incident_query_cap, 50);
        assert_eq!(config.incident_history_capacity, None);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_prefixed_variables_override_defaults() {
        let config = SimulatorConfig::from_vars(vars(&[
            ("SIMULATOR_API_PORT", "9100"),
            ("SIMULATOR_NAMESPACE", "staging"),
            ("SIMULATOR_SEED", "42"),
            ("SIMULATOR_INCIDENT_HISTORY_CAPACITY", "500"),
        ]))
        .unwrap();

        assert_eq!(config.api_port, 9100);
        assert_eq!(config.namespace, "staging");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.incident_history_capacity, Some(500));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = SimulatorConfig::from_vars(vars(&[("SIMULATOR_API_PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_larger_metrics_store_keeps_query_cap() {
        let config = SimulatorConfig::from_vars(vars(&[(
            "SIMULATOR_METRICS_HISTORY_CAPACITY",
            "500",
        )]))
        .unwrap();
        let engine = config.engine_config();

        assert_eq!(engine.metrics_history.capacity, Some(500));
        assert_eq!(engine.metrics_history.query_cap, 100);
    }

    #[test]
    fn test_engine_config_mapping() {
        let config = SimulatorConfig {
            incident_history_capacity: Some(200),
            seed: Some(7),
            ..SimulatorConfig::default()
        };
        let engine = config.engine_config();

        assert_eq!(engine.metrics_history, HistoryConfig::bounded(100));
        assert_eq!(engine.incident_history.capacity, Some(200));
        assert_eq!(engine.incident_history.query_cap, 50);
        assert_eq!(engine.seed, Some(7));
        assert_eq!(engine.profiles.len(), 4);
    }
}
