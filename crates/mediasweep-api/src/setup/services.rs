//! Service initialization

use crate::auth::AuthState;
use crate::state::AppState;
use anyhow::{Context, Result};
use mediasweep_core::Config;
use mediasweep_db::{create_deleter, MySqlContentStore};
use mediasweep_infra::NonceService;
use sqlx::MySqlPool;
use std::sync::Arc;

/// Build the content store, the deletion backend and the shared state.
pub fn initialize_services(config: &Config, pool: MySqlPool) -> Result<Arc<AppState>> {
    let deleter = create_deleter(config.store(), pool.clone())
        .context("Failed to initialize the deletion backend")?;
    tracing::info!(backend = deleter.backend(), "Deletion backend ready");

    let store = MySqlContentStore::new(pool, config.store(), deleter)
        .context("Failed to initialize the content store")?;

    let nonces = NonceService::new(config.nonce_secret(), config.nonce_ttl_secs());
    let auth = AuthState {
        admin_api_key: config.admin_api_key().to_string(),
        editor_api_key: config.editor_api_key().map(str::to_string),
    };
    if auth.editor_api_key.is_none() {
        tracing::info!("No editor API key configured, only administrators can delete");
    }

    Ok(Arc::new(AppState::new(Arc::new(store), nonces, auth)))
}
