//! Generator library for the AIOps telemetry simulator
//!
//! This crate provides the core functionality for:
//! - Sampling metric snapshots, incidents and log entries
//! - Bounded recency history for generated records
//! - Injectable randomness with a seeded mode for reproducible output
//! - Health checks and observability

pub mod engine;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod random;
pub mod sampler;
pub mod system;

pub use engine::{EngineConfig, HistoryWindow, IncidentSummary, SimulatedIncident, TelemetryEngine};
pub use error::{Result, SimulatorError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthReport, ReadinessResponse,
};
pub use history::{HistoryBuffer, HistoryConfig, HistoryEntry, HistoryStats};
pub use models::*;
pub use observability::{SimulatorMetrics, StructuredLogger};
pub use random::{RandomSource, RngSource};
pub use system::SystemInfo;
