//! Attachment deletion backends
//!
//! `rest` goes through the WordPress REST API, which runs every deletion hook
//! plugins registered. `database` removes the rows and files directly, for sites
//! where the REST API is disabled.

mod database;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use mediasweep_core::{AppError, AssetId, DeleteBackend, StoreConfig};
use sqlx::MySqlPool;

pub use database::{attachment_files, DatabaseDeleter};
pub use rest::RestDeleter;

use super::tables::WpTables;

/// Permanently deletes one attachment.
#[async_trait]
pub trait AssetDeleter: Send + Sync {
    /// `Ok(true)` when the attachment was deleted, `Ok(false)` when it did not exist.
    async fn delete(&self, id: AssetId) -> Result<bool, AppError>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}

/// Build the deleter selected by `DELETE_BACKEND`.
pub fn create_deleter(
    config: &StoreConfig,
    pool: MySqlPool,
) -> Result<Arc<dyn AssetDeleter>, AppError> {
    match config.delete_backend {
        DeleteBackend::Rest => Ok(Arc::new(RestDeleter::from_config(config)?)),
        DeleteBackend::Database => {
            let uploads_dir = config.uploads_dir.clone().ok_or_else(|| {
                AppError::Config("UPLOADS_DIR is required for database deletion".to_string())
            })?;
            Ok(Arc::new(DatabaseDeleter::new(
                pool,
                WpTables::new(&config.table_prefix)?,
                uploads_dir,
            )))
        }
    }
}
