use mediasweep_core::{AppError, MediaAsset};
use mediasweep_db::ContentStore;

use super::service::ReferenceScanner;

/// Scan the whole media library and return the unused attachments as display rows,
/// newest first.
///
/// An attachment deleted between the scan and the lookup of its record is skipped.
#[tracing::instrument(skip(scanner, store))]
pub async fn list_unused_media(
    scanner: &ReferenceScanner,
    store: &dyn ContentStore,
) -> Result<Vec<MediaAsset>, AppError> {
    let ids = store.list_asset_ids().await?;
    let result = scanner.find_unreferenced(&ids, store).await?;

    let mut rows = Vec::with_capacity(result.unreferenced.len());
    for id in result.unreferenced {
        match store.get_asset(id).await? {
            Some(record) => rows.push(MediaAsset::from(record)),
            None => tracing::debug!(asset_id = %id, "Attachment disappeared during scan"),
        }
    }

    Ok(rows)
}
