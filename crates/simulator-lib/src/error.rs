//! Error types for the telemetry generators

use thiserror::Error;

/// Result alias used across the simulator library
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Failures that can abort a single generation call.
///
/// Out-of-range query limits are not represented here: they are clamped
/// by the history buffers and never surface as errors.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A template or lookup key has no registered handler
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unexpected failure while sampling
    #[error("generation failed: {0}")]
    Generation(String),
}

impl SimulatorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            SimulatorError::Configuration(_) => "configuration",
            SimulatorError::Generation(_) => "generation",
        }
    }
}
