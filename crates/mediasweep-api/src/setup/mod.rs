//! Application setup and initialization
//!
//! Everything the server needs is built here explicitly and handed to the router.
//! Nothing is registered through globals.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediasweep_core::Config;
use std::sync::Arc;

/// Default log filter of the server binary
const DEFAULT_LOG_FILTER: &str = "mediasweep=debug,tower_http=debug";

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    mediasweep_infra::init_tracing(DEFAULT_LOG_FILTER, config.log_format())
        .context("Failed to initialize tracing")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let state = services::initialize_services(&config, pool)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
