//! Database setup

use anyhow::Result;
use mediasweep_core::Config;
use sqlx::MySqlPool;

/// Connect to the WordPress database.
///
/// The schema belongs to WordPress; nothing is migrated.
pub async fn setup_database(config: &Config) -> Result<MySqlPool> {
    tracing::info!("Connecting to database...");
    let pool = mediasweep_db::connect_pool(config.store()).await?;

    tracing::info!(
        max_connections = config.store().db_max_connections,
        table_prefix = %config.store().table_prefix,
        "Database connected successfully"
    );

    Ok(pool)
}
