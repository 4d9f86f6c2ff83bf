//! Application setup and initialization
//!
//! Startup wiring lives here rather than in main.rs so tests can assemble the
//! same router around their own state.

pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use stylist_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    config.validate().context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    let state = services::initialize_services(&config).await?;
    services::start_background_tasks(&config, &state);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
