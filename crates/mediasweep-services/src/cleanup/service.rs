use mediasweep_core::{AppError, AssetId, DeletionReport};
use mediasweep_db::ContentStore;

/// Bulk deletion of attachments picked by an operator.
///
/// Each id is deleted on its own. A failure is logged and recorded in the report,
/// then the batch moves on. Nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct DeletionService;

impl DeletionService {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(skip(self, ids, store), fields(cleanup.requested = ids.len()))]
    pub async fn delete_assets(
        &self,
        ids: &[AssetId],
        store: &dyn ContentStore,
    ) -> Result<DeletionReport, AppError> {
        if ids.is_empty() {
            return Err(AppError::NoInput);
        }

        let mut report = DeletionReport {
            requested: ids.len(),
            ..Default::default()
        };

        for &id in ids {
            match store.delete_asset(id).await {
                Ok(true) => {
                    tracing::debug!(asset_id = %id, "Deleted attachment");
                    report.deleted += 1;
                }
                Ok(false) => {
                    tracing::debug!(asset_id = %id, "Attachment already gone");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        asset_id = %id,
                        "Failed to delete attachment, continuing with batch"
                    );
                    report.failed.push(id);
                }
            }
        }

        tracing::info!(
            requested = report.requested,
            deleted = report.deleted,
            failed = report.failed.len(),
            "Deletion completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasweep_db::MemoryContentStore;

    fn ids(ns: &[u64]) -> Vec<AssetId> {
        ns.iter().map(|&n| AssetId::new(n).unwrap()).collect()
    }

    fn store() -> MemoryContentStore {
        MemoryContentStore::new()
            .with_attachment(1, "https://x.test/1.jpg", "image/jpeg")
            .with_attachment(2, "https://x.test/2.jpg", "image/jpeg")
            .with_attachment(3, "https://x.test/3.jpg", "image/jpeg")
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let err = DeletionService::new()
            .delete_assets(&[], &store())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoInput));
        assert_eq!(err.to_string(), "No IDs provided.");
    }

    #[tokio::test]
    async fn counts_only_successful_deletions() {
        let store = store();
        store.fail_delete(2);

        let report = DeletionService::new()
            .delete_assets(&ids(&[1, 2, 3, 42]), &store)
            .await
            .unwrap();

        assert_eq!(report.requested, 4);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, ids(&[2]));
        assert_eq!(report.message(), "Deleted 2 attachments.");
        assert!(!store.contains_asset(1));
        assert!(store.contains_asset(2));
        assert!(!store.contains_asset(3));
    }

    #[tokio::test]
    async fn deleting_twice_counts_once() {
        let store = store();
        let service = DeletionService::new();

        let first = service.delete_assets(&ids(&[1]), &store).await.unwrap();
        let second = service.delete_assets(&ids(&[1]), &store).await.unwrap();

        assert_eq!(first.deleted, 1);
        assert_eq!(second.deleted, 0);
        assert!(second.failed.is_empty());
    }
}
