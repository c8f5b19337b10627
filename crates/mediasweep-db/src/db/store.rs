use async_trait::async_trait;
use mediasweep_core::{AppError, AssetId, AssetRecord, ReferenceQuery};

/// Read and delete access to a site's media library and content graph.
///
/// Every call reads the store as it is now. Implementations keep no cache between
/// calls, so two scans of an unchanged store give the same answer.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Ids of every attachment in the media library, newest first.
    async fn list_asset_ids(&self) -> Result<Vec<AssetId>, AppError>;

    /// One attachment, or `None` when the id is not an attachment.
    async fn get_asset(&self, id: AssetId) -> Result<Option<AssetRecord>, AppError>;

    /// Whether anything in the content graph matches the query.
    async fn query_exists(&self, query: &ReferenceQuery<'_>) -> Result<bool, AppError>;

    /// Delete an attachment and its files. `Ok(false)` when there was nothing to delete.
    async fn delete_asset(&self, id: AssetId) -> Result<bool, AppError>;

    /// Verify the store is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
