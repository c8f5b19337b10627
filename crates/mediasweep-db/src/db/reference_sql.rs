//! SQL for the reference lookups.
//!
//! Each [`ReferenceKind`] maps to one `SELECT 1 ... LIMIT 1` statement. Statements
//! are built as plain text plus bind values so they can be inspected without a
//! database.

use mediasweep_core::constants::{REVISION_POST_TYPE, THUMBNAIL_META_KEY};
use mediasweep_core::{ReferenceKind, ReferenceQuery};

use super::like::contains_pattern;
use super::tables::WpTables;

/// A bind value of a reference statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bind {
    Int(u64),
    Text(String),
}

/// A statement ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSql {
    pub sql: String,
    pub binds: Vec<Bind>,
}

/// Build the statement for one reference query.
///
/// Returns `None` when the lookup cannot match anything, which is the case for
/// page-builder URLs when no page-builder meta key is configured.
///
/// Comparisons of `meta_value` against an integer use MySQL's numeric coercion,
/// so `'12abc'` equals 12. An empty URL becomes the pattern `%%`, which matches
/// any row; an attachment without URL is therefore reported as referenced.
pub fn build_reference_sql(
    query: &ReferenceQuery<'_>,
    tables: &WpTables,
    page_builder_meta_keys: &[String],
) -> Option<ReferenceSql> {
    let id = query.asset_id.get();
    let quoted = contains_pattern(&query.asset_id.quoted());
    let revision = Bind::Text(REVISION_POST_TYPE.to_string());

    let (sql, binds) = match query.kind {
        ReferenceKind::FeaturedImage => (
            format!(
                "SELECT 1 FROM {pm} pm INNER JOIN {p} p ON pm.post_id = p.ID \
                 WHERE pm.meta_key = ? AND pm.meta_value = ? AND p.post_type <> ? LIMIT 1",
                pm = tables.postmeta,
                p = tables.posts
            ),
            vec![
                Bind::Text(THUMBNAIL_META_KEY.to_string()),
                Bind::Int(id),
                revision,
            ],
        ),
        ReferenceKind::MetaExact => (
            format!(
                "SELECT 1 FROM {pm} pm INNER JOIN {p} p ON pm.post_id = p.ID \
                 WHERE pm.meta_value = ? AND p.post_type <> ? LIMIT 1",
                pm = tables.postmeta,
                p = tables.posts
            ),
            vec![Bind::Int(id), revision],
        ),
        ReferenceKind::MetaSerialized => (
            format!(
                "SELECT 1 FROM {pm} pm INNER JOIN {p} p ON pm.post_id = p.ID \
                 WHERE pm.meta_value LIKE ? AND p.post_type <> ? LIMIT 1",
                pm = tables.postmeta,
                p = tables.posts
            ),
            vec![Bind::Text(quoted), revision],
        ),
        ReferenceKind::ContentUrl => (
            format!(
                "SELECT 1 FROM {p} WHERE post_content LIKE ? AND post_type <> ? LIMIT 1",
                p = tables.posts
            ),
            vec![Bind::Text(contains_pattern(query.url)), revision],
        ),
        ReferenceKind::PageBuilderUrl => {
            if page_builder_meta_keys.is_empty() {
                return None;
            }
            let placeholders = vec!["?"; page_builder_meta_keys.len()].join(", ");
            let mut binds: Vec<Bind> = page_builder_meta_keys
                .iter()
                .map(|key| Bind::Text(key.clone()))
                .collect();
            binds.push(Bind::Text(contains_pattern(query.url)));
            binds.push(revision);
            (
                format!(
                    "SELECT 1 FROM {pm} pm INNER JOIN {p} p ON pm.post_id = p.ID \
                     WHERE pm.meta_key IN ({placeholders}) AND pm.meta_value LIKE ? \
                     AND p.post_type <> ? LIMIT 1",
                    pm = tables.postmeta,
                    p = tables.posts
                ),
                binds,
            )
        }
        ReferenceKind::ContentId => (
            format!(
                "SELECT 1 FROM {p} WHERE post_content LIKE ? AND post_type <> ? LIMIT 1",
                p = tables.posts
            ),
            vec![Bind::Text(quoted), revision],
        ),
        ReferenceKind::TermMeta => (
            format!(
                "SELECT 1 FROM {tm} WHERE meta_value = ? OR meta_value LIKE ? LIMIT 1",
                tm = tables.termmeta
            ),
            vec![Bind::Int(id), Bind::Text(quoted)],
        ),
        ReferenceKind::UserMeta => (
            format!(
                "SELECT 1 FROM {um} WHERE meta_value = ? OR meta_value LIKE ? LIMIT 1",
                um = tables.usermeta
            ),
            vec![Bind::Int(id), Bind::Text(quoted)],
        ),
    };

    Some(ReferenceSql { sql, binds })
}
