//! Telemetry samplers
//!
//! Each sampler turns draws from a [`RandomSource`](crate::random::RandomSource)
//! into one record:
//! - Metric snapshots with correlated spikes and anomaly flags
//! - Incidents with type-specific templated content
//! - Level-weighted application log lines

mod incident;
mod logs;
mod metrics;

pub use incident::{suggested_actions, suggested_actions_for, IncidentSampler, TEAMS};
pub use logs::{render_template, template_fields, templates, LogField, LogSampler};
pub use metrics::{MetricSampler, SpikeModel};
