//! Static description of the simulated cluster

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SERVICES: [(&str, &str, &str); 4] = [
    ("api-gateway", "running", "v1.2.3"),
    ("user-service", "running", "v2.1.0"),
    ("payment-service", "degraded", "v1.5.2"),
    ("notification-service", "running", "v1.0.1"),
];

const NODES: [(&str, &str, &str); 2] = [
    ("node-1", "worker", "francecentral-1"),
    ("node-2", "worker", "francecentral-2"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub role: String,
    pub zone: String,
}

/// Topology reported by the system info endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub environment: String,
    pub cluster: String,
    pub namespace: String,
    pub services: Vec<ServiceInfo>,
    pub nodes: Vec<NodeInfo>,
    pub timestamp: DateTime<Utc>,
}

impl SystemInfo {
    pub fn simulated(environment: &str, cluster: &str, namespace: &str, now: DateTime<Utc>) -> Self {
        Self {
            environment: environment.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
            services: SERVICES
                .iter()
                .map(|(name, status, version)| ServiceInfo {
                    name: name.to_string(),
                    status: status.to_string(),
                    version: version.to_string(),
                })
                .collect(),
            nodes: NODES
                .iter()
                .map(|(name, role, zone)| NodeInfo {
                    name: name.to_string(),
                    role: role.to_string(),
                    zone: zone.to_string(),
                })
                .collect(),
            timestamp: now,
        }
    }
}
