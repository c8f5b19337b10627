use serde::Serialize;
use utoipa::ToSchema;

use super::AssetId;

/// Outcome of scanning a set of attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScanResult {
    pub scanned: usize,
    /// Unreferenced attachments, in the order they were scanned
    pub unreferenced: Vec<AssetId>,
}

/// Attachments split by whether anything references them. Both sides keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Partition {
    pub referenced: Vec<AssetId>,
    pub unreferenced: Vec<AssetId>,
}

/// Outcome of a bulk deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeletionReport {
    pub requested: usize,
    pub deleted: usize,
    /// Ids whose deletion returned an error
    pub failed: Vec<AssetId>,
}

impl DeletionReport {
    pub fn message(&self) -> String {
        format!("Deleted {} attachments.", self.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_message_counts_deleted_only() {
        let report = DeletionReport {
            requested: 3,
            deleted: 2,
            failed: vec![AssetId::new(9).unwrap()],
        };
        assert_eq!(report.message(), "Deleted 2 attachments.");
    }
}
