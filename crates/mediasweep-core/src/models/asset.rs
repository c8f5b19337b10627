use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Identifier of a media attachment (the WordPress post ID). Always positive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "u64", into = "u64")]
#[schema(value_type = u64, example = 42)]
pub struct AssetId(u64);

impl AssetId {
    pub fn new(id: u64) -> Result<Self, AppError> {
        if id == 0 {
            return Err(AppError::InvalidInput(
                "Attachment id must be a positive integer".to_string(),
            ));
        }
        Ok(AssetId(id))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The id wrapped in double quotes, as it appears inside serialized arrays and JSON.
    pub fn quoted(self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl TryFrom<u64> for AssetId {
    type Error = AppError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        AssetId::new(id)
    }
}

impl From<AssetId> for u64 {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl FromStr for AssetId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::InvalidInput(format!("Invalid attachment id: '{}'", s)))?;
        AssetId::new(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An attachment as stored: its id, public URL and MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub id: AssetId,
    pub url: String,
    pub mime_type: String,
}

impl AssetRecord {
    /// Last path segment of the URL, without query string or fragment.
    pub fn filename(&self) -> &str {
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        path.rsplit('/').next().unwrap_or(path)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Public URL of an attachment.
///
/// `_wp_attached_file` holds a path relative to the uploads directory unless an
/// offload plugin rewrote it to an absolute URL. Without a configured uploads base
/// URL the post `guid` is used, which WordPress sets to the file URL at upload time.
pub fn derive_asset_url(
    attached_file: Option<&str>,
    uploads_base_url: Option<&str>,
    guid: &str,
) -> String {
    match attached_file.map(str::trim).filter(|f| !f.is_empty()) {
        Some(file) if file.starts_with("http://") || file.starts_with("https://") => {
            file.to_string()
        }
        Some(file) => match uploads_base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                file.trim_start_matches('/')
            ),
            None => guid.to_string(),
        },
        None => guid.to_string(),
    }
}

/// A row of the unused media list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MediaAsset {
    pub id: AssetId,
    /// Preview URL, present for image attachments only
    pub thumbnail: Option<String>,
    pub filename: String,
    pub url: String,
}

impl From<AssetRecord> for MediaAsset {
    fn from(record: AssetRecord) -> Self {
        MediaAsset {
            id: record.id,
            thumbnail: record.is_image().then(|| record.url.clone()),
            filename: record.filename().to_string(),
            url: record.url,
        }
    }
}
