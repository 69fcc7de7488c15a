//! Application setup and initialization
//!
//! Everything `main` needs to turn a `Config` into a running router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use crate::telemetry::{init_telemetry, LogFormat};
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    init_telemetry(LogFormat::from_env()).context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, pool, storage).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
