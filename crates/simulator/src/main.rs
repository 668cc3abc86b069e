//! AIOps Simulator - synthetic telemetry service
//!
//! Serves simulated metrics, incidents and application logs for
//! dashboards and AIOps demonstrations.

use aiops_simulator::{
    api::{self, AppState, Deployment, VERSION},
    config::SimulatorConfig,
};
use anyhow::Result;
use simulator_lib::{HealthRegistry, SimulatorMetrics, StructuredLogger, TelemetryEngine};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // JSON output, level from RUST_LOG
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = SimulatorConfig::load()?;
    info!(
        namespace = %config.namespace,
        cluster = %config.cluster_name,
        seeded = config.seed.is_some(),
        "Simulator configured"
    );

    let engine = TelemetryEngine::new(config.engine_config())?;
    let health_registry = HealthRegistry::for_samplers().await;

    let metrics = SimulatorMetrics::new();
    metrics.set_build_info(VERSION);

    let logger = StructuredLogger::new(api::SERVICE_NAME);
    logger.log_startup(VERSION, config.api_port, config.seed.is_some());

    let state = Arc::new(AppState::new(
        engine,
        health_registry.clone(),
        metrics,
        Deployment::from(&config),
    ));

    health_registry.set_ready(true).await;

    let server = tokio::spawn(api::serve(config.api_port, state));

    tokio::select! {
        result = server => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("server exited"),
                Ok(Err(e)) => {
                    error!(error = %e, "API server failed");
                    logger.log_shutdown("server error");
                    return Err(e);
                }
                Err(e) => {
                    error!(error = %e, "API server task aborted");
                    logger.log_shutdown("server task aborted");
                    return Err(e.into());
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
