use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use mediasweep_core::constants::{
    ATTACHED_FILE_META_KEY, ATTACHMENT_POST_STATUS, ATTACHMENT_POST_TYPE,
};
use mediasweep_core::models::derive_asset_url;
use mediasweep_core::{AppError, AssetId, AssetRecord, ReferenceQuery, StoreConfig};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, MySqlPool};

use super::deleter::AssetDeleter;
use super::reference_sql::{build_reference_sql, Bind};
use super::store::ContentStore;
use super::tables::WpTables;

/// Open the connection pool described by the store configuration.
pub async fn connect_pool(config: &StoreConfig) -> anyhow::Result<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the WordPress database")
}

/// Content store over a live WordPress database.
#[derive(Clone)]
pub struct MySqlContentStore {
    pool: MySqlPool,
    tables: WpTables,
    uploads_base_url: Option<String>,
    page_builder_meta_keys: Vec<String>,
    deleter: Arc<dyn AssetDeleter>,
}

impl MySqlContentStore {
    pub fn new(
        pool: MySqlPool,
        config: &StoreConfig,
        deleter: Arc<dyn AssetDeleter>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            pool,
            tables: WpTables::new(&config.table_prefix)?,
            uploads_base_url: config.uploads_base_url.clone(),
            page_builder_meta_keys: config.page_builder_meta_keys.clone(),
            deleter,
        })
    }
}

#[async_trait]
impl ContentStore for MySqlContentStore {
    #[tracing::instrument(skip(self), fields(db.system = "mysql", db.table = "posts", db.operation = "select"))]
    async fn list_asset_ids(&self) -> Result<Vec<AssetId>, AppError> {
        let ids = sqlx::query_scalar::<MySql, u64>(&format!(
            "SELECT ID FROM {} WHERE post_type = ? AND post_status = ? \
             ORDER BY post_date DESC, ID DESC",
            self.tables.posts
        ))
        .bind(ATTACHMENT_POST_TYPE)
        .bind(ATTACHMENT_POST_STATUS)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids
            .into_iter()
            .filter_map(|id| AssetId::new(id).ok())
            .collect())
    }

    #[tracing::instrument(skip(self), fields(db.system = "mysql", db.table = "posts", db.operation = "select", db.record_id = %id))]
    async fn get_asset(&self, id: AssetId) -> Result<Option<AssetRecord>, AppError> {
        let row = sqlx::query_as::<MySql, (String, String, Option<String>)>(&format!(
            "SELECT p.guid, p.post_mime_type, \
             (SELECT pm.meta_value FROM {pm} pm WHERE pm.post_id = p.ID AND pm.meta_key = ? LIMIT 1) \
             FROM {p} p WHERE p.ID = ? AND p.post_type = ?",
            pm = self.tables.postmeta,
            p = self.tables.posts
        ))
        .bind(ATTACHED_FILE_META_KEY)
        .bind(id.get())
        .bind(ATTACHMENT_POST_TYPE)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(guid, mime_type, attached_file)| AssetRecord {
            id,
            url: derive_asset_url(
                attached_file.as_deref(),
                self.uploads_base_url.as_deref(),
                &guid,
            ),
            mime_type,
        }))
    }

    #[tracing::instrument(skip(self, query), fields(db.system = "mysql", db.operation = "select", reference.kind = %query.kind, asset_id = %query.asset_id))]
    async fn query_exists(&self, query: &ReferenceQuery<'_>) -> Result<bool, AppError> {
        let Some(stmt) = build_reference_sql(query, &self.tables, &self.page_builder_meta_keys)
        else {
            return Ok(false);
        };

        let mut sql = sqlx::query::<MySql>(&stmt.sql);
        for bind in stmt.binds {
            sql = match bind {
                Bind::Int(value) => sql.bind(value),
                Bind::Text(value) => sql.bind(value),
            };
        }

        let row = sql.fetch_optional(&self.pool).await.map_err(|e| {
            tracing::error!(error = ?e, kind = %query.kind, "Reference lookup failed");
            AppError::Database(e)
        })?;

        Ok(row.is_some())
    }

    #[tracing::instrument(skip(self), fields(db.system = "mysql", db.operation = "delete", db.record_id = %id, backend = self.deleter.backend()))]
    async fn delete_asset(&self, id: AssetId) -> Result<bool, AppError> {
        self.deleter.delete(id).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
