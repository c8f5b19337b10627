use mediasweep_core::{AppError, AssetId, Partition, ReferenceKind, ReferenceQuery, ScanResult};
use mediasweep_db::ContentStore;

use super::policy::ReferencePolicy;

/// Decides whether attachments are referenced anywhere in the content graph.
///
/// Lookups run one after another, in policy order. A store failure aborts the
/// whole call; it is never read as "not referenced".
#[derive(Debug, Clone, Default)]
pub struct ReferenceScanner {
    policy: ReferencePolicy,
}

impl ReferenceScanner {
    pub fn new(policy: ReferencePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReferencePolicy {
        &self.policy
    }

    /// URL used by the URL checks. An attachment without a record yields an empty
    /// URL, which every URL check treats as matching.
    async fn asset_url(&self, id: AssetId, store: &dyn ContentStore) -> Result<String, AppError> {
        match store.get_asset(id).await? {
            Some(record) => Ok(record.url),
            None => {
                tracing::debug!(asset_id = %id, "No attachment record, URL checks match anything");
                Ok(String::new())
            }
        }
    }

    /// Whether any check matches. Stops at the first match.
    #[tracing::instrument(skip(self, store), fields(asset_id = %id))]
    pub async fn is_referenced(
        &self,
        id: AssetId,
        store: &dyn ContentStore,
    ) -> Result<bool, AppError> {
        let mut url: Option<String> = None;

        for &kind in self.policy.kinds() {
            if kind.needs_url() && url.is_none() {
                url = Some(self.asset_url(id, store).await?);
            }

            let query = ReferenceQuery::new(kind, id, url.as_deref().unwrap_or_default());
            if store.query_exists(&query).await? {
                tracing::debug!(reference.kind = %kind, "Attachment is referenced");
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Every check that matches, without short-circuiting.
    #[tracing::instrument(skip(self, store), fields(asset_id = %id))]
    pub async fn explain(
        &self,
        id: AssetId,
        store: &dyn ContentStore,
    ) -> Result<Vec<ReferenceKind>, AppError> {
        let url = if self.policy.kinds().iter().any(ReferenceKind::needs_url) {
            self.asset_url(id, store).await?
        } else {
            String::new()
        };

        let mut matches = Vec::new();
        for &kind in self.policy.kinds() {
            let query = ReferenceQuery::new(kind, id, &url);
            if store.query_exists(&query).await? {
                matches.push(kind);
            }
        }

        Ok(matches)
    }

    /// Unreferenced ids, in input order.
    #[tracing::instrument(skip(self, ids, store), fields(scan.assets = ids.len()))]
    pub async fn find_unreferenced(
        &self,
        ids: &[AssetId],
        store: &dyn ContentStore,
    ) -> Result<ScanResult, AppError> {
        let partition = self.partition(ids, store).await?;

        tracing::info!(
            scanned = ids.len(),
            unreferenced = partition.unreferenced.len(),
            "Reference scan completed"
        );

        Ok(ScanResult {
            scanned: ids.len(),
            unreferenced: partition.unreferenced,
        })
    }

    /// Split ids into referenced and unreferenced, both in input order.
    pub async fn partition(
        &self,
        ids: &[AssetId],
        store: &dyn ContentStore,
    ) -> Result<Partition, AppError> {
        let mut partition = Partition::default();

        for &id in ids {
            match self.is_referenced(id, store).await {
                Ok(true) => partition.referenced.push(id),
                Ok(false) => partition.unreferenced.push(id),
                Err(e) => {
                    tracing::error!(asset_id = %id, error = %e, "Reference scan aborted");
                    return Err(e);
                }
            }
        }

        Ok(partition)
    }
}
