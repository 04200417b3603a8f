//! FMAA dashboard API server
//!
//! Serves the dashboard JSON API over an in-process document store.

use std::sync::Arc;

use anyhow::Result;
use dashboard_lib::{
    health::{components, HealthRegistry},
    observability::StructuredLogger,
    ServiceContext,
};
use fmaa_dashboard::{api, config::DashboardConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DASHBOARD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting fmaa-dashboard");

    let config = DashboardConfig::load()?;
    info!(
        service_name = %config.service_name,
        api_port = config.api_port,
        "Dashboard configured"
    );

    let context = ServiceContext::in_memory(&config.service_name);

    let health_registry = HealthRegistry::new();
    health_registry.register(components::STORE).await;
    health_registry.register(components::INGESTOR).await;
    health_registry.check_store(context.store.as_ref()).await;

    let logger = StructuredLogger::new(&config.service_name);
    logger.log_startup(DASHBOARD_VERSION, config.api_port);

    let app_state = Arc::new(api::AppState::new(
        config.service_name.clone(),
        context,
        health_registry.clone(),
    ));

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config, app_state));

    tokio::select! {
        result = api_handle => {
            result??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
