//! AIOps telemetry simulator service
//!
//! HTTP surface over the generators in `simulator-lib`.

pub mod api;
pub mod config;
