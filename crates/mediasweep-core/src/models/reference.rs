use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AssetId;

/// A way one entity of the content graph can reference an attachment.
///
/// Variants are listed in the order the scanner evaluates them. The order only
/// matters for short-circuiting; any match marks the attachment as referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Featured image (`_thumbnail_id`) of a post.
    FeaturedImage,
    /// A post meta value equal to the id.
    MetaExact,
    /// The quoted id inside a post meta value (serialized galleries, JSON lists).
    MetaSerialized,
    /// The attachment URL inside post content.
    ContentUrl,
    /// The attachment URL inside page-builder layout data.
    PageBuilderUrl,
    /// The quoted id inside post content (block attributes, shortcodes).
    ContentId,
    /// A term meta value equal to or quoting the id.
    TermMeta,
    /// A user meta value equal to or quoting the id.
    UserMeta,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 8] = [
        ReferenceKind::FeaturedImage,
        ReferenceKind::MetaExact,
        ReferenceKind::MetaSerialized,
        ReferenceKind::ContentUrl,
        ReferenceKind::PageBuilderUrl,
        ReferenceKind::ContentId,
        ReferenceKind::TermMeta,
        ReferenceKind::UserMeta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::FeaturedImage => "featured_image",
            ReferenceKind::MetaExact => "meta_exact",
            ReferenceKind::MetaSerialized => "meta_serialized",
            ReferenceKind::ContentUrl => "content_url",
            ReferenceKind::PageBuilderUrl => "page_builder_url",
            ReferenceKind::ContentId => "content_id",
            ReferenceKind::TermMeta => "term_meta",
            ReferenceKind::UserMeta => "user_meta",
        }
    }

    /// Whether evaluating this kind needs the attachment URL.
    pub fn needs_url(&self) -> bool {
        matches!(self, ReferenceKind::ContentUrl | ReferenceKind::PageBuilderUrl)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lookup against the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceQuery<'a> {
    pub kind: ReferenceKind,
    pub asset_id: AssetId,
    /// Attachment URL. Empty when the kind does not need it or the attachment has none.
    pub url: &'a str,
}

impl<'a> ReferenceQuery<'a> {
    pub fn new(kind: ReferenceKind, asset_id: AssetId, url: &'a str) -> Self {
        ReferenceQuery {
            kind,
            asset_id,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_lists_every_kind_once() {
        let unique: HashSet<_> = ReferenceKind::ALL.iter().collect();
        assert_eq!(unique.len(), 8);
        assert_eq!(ReferenceKind::ALL[0], ReferenceKind::FeaturedImage);
    }

    #[test]
    fn only_url_kinds_need_url() {
        let url_kinds: Vec<_> = ReferenceKind::ALL
            .iter()
            .filter(|k| k.needs_url())
            .collect();
        assert_eq!(
            url_kinds,
            vec![&ReferenceKind::ContentUrl, &ReferenceKind::PageBuilderUrl]
        );
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&ReferenceKind::PageBuilderUrl).unwrap(),
            "\"page_builder_url\""
        );
        assert_eq!(ReferenceKind::TermMeta.to_string(), "term_meta");
    }
}
