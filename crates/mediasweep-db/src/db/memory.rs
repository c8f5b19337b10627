//! In-memory content store
//!
//! Holds a snapshot of the posts, post meta, term meta and user meta tables and
//! evaluates reference queries with the same rules MySQL applies to the SQL in
//! [`reference_sql`](super::reference_sql): case-insensitive LIKE, and numeric
//! coercion of text values compared against an integer. Used by tests and demos
//! that should not need a database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mediasweep_core::constants::{
    ATTACHMENT_POST_STATUS, ATTACHMENT_POST_TYPE, ELEMENTOR_DATA_META_KEY, REVISION_POST_TYPE,
    THUMBNAIL_META_KEY,
};
use mediasweep_core::{AppError, AssetId, AssetRecord, ReferenceKind, ReferenceQuery};

use super::store::ContentStore;

#[derive(Debug, Clone)]
struct PostRow {
    id: u64,
    post_type: String,
    post_status: String,
    content: String,
    guid: String,
    mime_type: String,
}

#[derive(Debug, Clone)]
struct MetaRow {
    owner_id: u64,
    key: String,
    value: String,
}

#[derive(Debug, Default)]
struct Snapshot {
    /// Insertion order; later rows are newer.
    posts: Vec<PostRow>,
    postmeta: Vec<MetaRow>,
    termmeta: Vec<MetaRow>,
    usermeta: Vec<MetaRow>,
}

impl Snapshot {
    fn post(&self, id: u64) -> Option<&PostRow> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn is_live_post(&self, id: u64) -> bool {
        self.post(id)
            .is_some_and(|p| p.post_type != REVISION_POST_TYPE)
    }

    fn live_postmeta(&self) -> impl Iterator<Item = &MetaRow> {
        self.postmeta
            .iter()
            .filter(move |m| self.is_live_post(m.owner_id))
    }

    fn live_content(&self) -> impl Iterator<Item = &str> {
        self.posts
            .iter()
            .filter(|p| p.post_type != REVISION_POST_TYPE)
            .map(|p| p.content.as_str())
    }
}

/// Content store over an in-memory snapshot.
#[derive(Clone)]
pub struct MemoryContentStore {
    snapshot: Arc<Mutex<Snapshot>>,
    page_builder_meta_keys: Vec<String>,
    fail_queries: Arc<AtomicBool>,
    failing_deletes: Arc<Mutex<HashSet<u64>>>,
    query_count: Arc<AtomicUsize>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Snapshot::default())),
            page_builder_meta_keys: vec![ELEMENTOR_DATA_META_KEY.to_string()],
            fail_queries: Arc::new(AtomicBool::new(false)),
            failing_deletes: Arc::new(Mutex::new(HashSet::new())),
            query_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn snapshot(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_page_builder_meta_keys(mut self, keys: Vec<String>) -> Self {
        self.page_builder_meta_keys = keys;
        self
    }

    /// Add an attachment whose file lives at `url`.
    pub fn with_attachment(self, id: u64, url: &str, mime_type: &str) -> Self {
        self.snapshot().posts.push(PostRow {
            id,
            post_type: ATTACHMENT_POST_TYPE.to_string(),
            post_status: ATTACHMENT_POST_STATUS.to_string(),
            content: String::new(),
            guid: url.to_string(),
            mime_type: mime_type.to_string(),
        });
        self
    }

    /// Add a post of any type (`post`, `page`, `revision`, ...).
    pub fn with_post(self, id: u64, post_type: &str, content: &str) -> Self {
        self.snapshot().posts.push(PostRow {
            id,
            post_type: post_type.to_string(),
            post_status: "publish".to_string(),
            content: content.to_string(),
            guid: String::new(),
            mime_type: String::new(),
        });
        self
    }

    pub fn with_post_meta(self, post_id: u64, key: &str, value: &str) -> Self {
        self.snapshot().postmeta.push(MetaRow {
            owner_id: post_id,
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Set `attachment_id` as the featured image of `post_id`.
    pub fn with_featured_image(self, post_id: u64, attachment_id: u64) -> Self {
        self.with_post_meta(post_id, THUMBNAIL_META_KEY, &attachment_id.to_string())
    }

    pub fn with_term_meta(self, term_id: u64, key: &str, value: &str) -> Self {
        self.snapshot().termmeta.push(MetaRow {
            owner_id: term_id,
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_user_meta(self, user_id: u64, key: &str, value: &str) -> Self {
        self.snapshot().usermeta.push(MetaRow {
            owner_id: user_id,
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Make every read fail as if the database went away.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail_queries.store(unavailable, Ordering::SeqCst);
    }

    /// Make deleting `id` fail.
    pub fn fail_delete(&self, id: u64) {
        self.failing_deletes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
    }

    /// Number of reference queries evaluated so far.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn contains_asset(&self, id: u64) -> bool {
        self.snapshot()
            .post(id)
            .is_some_and(|p| p.post_type == ATTACHMENT_POST_TYPE)
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `LIKE '%needle%'` under a case-insensitive collation.
fn like_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// `value = <integer>` for a text column: MySQL converts the text to a number
/// using its longest numeric prefix (leading whitespace skipped, no prefix is 0).
fn numeric_equals(value: &str, id: u64) -> bool {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits = has_digits || frac_end > frac_start;
            end = frac_end;
        }
    }
    if has_digits && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    let number = if has_digits {
        trimmed[..end].parse::<f64>().unwrap_or(0.0)
    } else {
        0.0
    };
    number == id as f64
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_asset_ids(&self) -> Result<Vec<AssetId>, AppError> {
        self.check_available()?;
        let snapshot = self.snapshot();
        Ok(snapshot
            .posts
            .iter()
            .rev()
            .filter(|p| {
                p.post_type == ATTACHMENT_POST_TYPE && p.post_status == ATTACHMENT_POST_STATUS
            })
            .filter_map(|p| AssetId::new(p.id).ok())
            .collect())
    }

    async fn get_asset(&self, id: AssetId) -> Result<Option<AssetRecord>, AppError> {
        self.check_available()?;
        let snapshot = self.snapshot();
        Ok(snapshot
            .post(id.get())
            .filter(|p| p.post_type == ATTACHMENT_POST_TYPE)
            .map(|p| AssetRecord {
                id,
                url: p.guid.clone(),
                mime_type: p.mime_type.clone(),
            }))
    }

    async fn query_exists(&self, query: &ReferenceQuery<'_>) -> Result<bool, AppError> {
        self.check_available()?;
        self.query_count.fetch_add(1, Ordering::SeqCst);

        let snapshot = self.snapshot();
        let id = query.asset_id.get();
        let quoted = query.asset_id.quoted();

        let found = match query.kind {
            ReferenceKind::FeaturedImage => snapshot
                .live_postmeta()
                .any(|m| m.key == THUMBNAIL_META_KEY && numeric_equals(&m.value, id)),
            ReferenceKind::MetaExact => snapshot
                .live_postmeta()
                .any(|m| numeric_equals(&m.value, id)),
            ReferenceKind::MetaSerialized => snapshot
                .live_postmeta()
                .any(|m| like_contains(&m.value, &quoted)),
            ReferenceKind::ContentUrl => snapshot
                .live_content()
                .any(|content| like_contains(content, query.url)),
            ReferenceKind::PageBuilderUrl => snapshot.live_postmeta().any(|m| {
                self.page_builder_meta_keys.contains(&m.key) && like_contains(&m.value, query.url)
            }),
            ReferenceKind::ContentId => snapshot
                .live_content()
                .any(|content| like_contains(content, &quoted)),
            ReferenceKind::TermMeta => snapshot
                .termmeta
                .iter()
                .any(|m| numeric_equals(&m.value, id) || like_contains(&m.value, &quoted)),
            ReferenceKind::UserMeta => snapshot
                .usermeta
                .iter()
                .any(|m| numeric_equals(&m.value, id) || like_contains(&m.value, &quoted)),
        };

        Ok(found)
    }

    async fn delete_asset(&self, id: AssetId) -> Result<bool, AppError> {
        self.check_available()?;
        let raw = id.get();
        if self
            .failing_deletes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&raw)
        {
            return Err(AppError::Deletion(format!(
                "injected failure deleting attachment {}",
                id
            )));
        }

        let mut snapshot = self.snapshot();
        let existed = snapshot
            .post(raw)
            .is_some_and(|p| p.post_type == ATTACHMENT_POST_TYPE);
        if !existed {
            return Ok(false);
        }

        let id_text = raw.to_string();
        snapshot.posts.retain(|p| p.id != raw);
        snapshot
            .postmeta
            .retain(|m| m.owner_id != raw && !(m.key == THUMBNAIL_META_KEY && m.value == id_text));
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> AssetId {
        AssetId::new(n).unwrap()
    }

    async fn exists(store: &MemoryContentStore, kind: ReferenceKind, n: u64, url: &str) -> bool {
        store
            .query_exists(&ReferenceQuery::new(kind, id(n), url))
            .await
            .unwrap()
    }

    #[test]
    fn numeric_equality_follows_mysql_coercion() {
        assert!(numeric_equals("12", 12));
        assert!(numeric_equals(" 12", 12));
        assert!(numeric_equals("12abc", 12));
        assert!(numeric_equals("12.0", 12));
        assert!(numeric_equals("2024/05/cat.jpg", 2024));
        assert!(!numeric_equals("123", 12));
        assert!(!numeric_equals("a:1:{i:0;i:12;}", 12));
        assert!(!numeric_equals("", 12));
    }

    #[test]
    fn like_is_case_insensitive() {
        assert!(like_contains("<img src=\"HTTPS://X.TEST/A.JPG\">", "https://x.test/a.jpg"));
        assert!(like_contains("anything", ""));
    }

    #[tokio::test]
    async fn lists_attachments_newest_first() {
        let store = MemoryContentStore::new()
            .with_attachment(1, "https://x.test/1.jpg", "image/jpeg")
            .with_post(10, "post", "")
            .with_attachment(2, "https://x.test/2.jpg", "image/jpeg");

        assert_eq!(store.list_asset_ids().await.unwrap(), vec![id(2), id(1)]);
    }

    #[tokio::test]
    async fn revisions_do_not_reference() {
        let store = MemoryContentStore::new()
            .with_attachment(5, "https://x.test/5.jpg", "image/jpeg")
            .with_post(20, "revision", "<img src=\"https://x.test/5.jpg\">")
            .with_featured_image(20, 5);

        assert!(!exists(&store, ReferenceKind::FeaturedImage, 5, "").await);
        assert!(!exists(&store, ReferenceKind::ContentUrl, 5, "https://x.test/5.jpg").await);
    }

    #[tokio::test]
    async fn quoted_id_does_not_match_longer_id() {
        let store = MemoryContentStore::new()
            .with_post(10, "post", "")
            .with_post_meta(10, "gallery", "a:1:{i:0;s:3:\"123\";}");

        assert!(!exists(&store, ReferenceKind::MetaSerialized, 12, "").await);
        assert!(exists(&store, ReferenceKind::MetaSerialized, 123, "").await);
    }

    #[tokio::test]
    async fn page_builder_only_checks_configured_keys() {
        let store = MemoryContentStore::new()
            .with_post(10, "page", "")
            .with_post_meta(10, "_other_builder", "{\"url\":\"https://x.test/a.jpg\"}");

        assert!(!exists(&store, ReferenceKind::PageBuilderUrl, 3, "https://x.test/a.jpg").await);

        let store = store.with_page_builder_meta_keys(vec!["_other_builder".to_string()]);
        assert!(exists(&store, ReferenceKind::PageBuilderUrl, 3, "https://x.test/a.jpg").await);
    }

    #[tokio::test]
    async fn delete_removes_attachment_and_links() {
        let store = MemoryContentStore::new()
            .with_attachment(1, "https://x.test/1.jpg", "image/jpeg")
            .with_post(10, "post", "")
            .with_featured_image(10, 1);

        assert!(store.delete_asset(id(1)).await.unwrap());
        assert!(!store.contains_asset(1));
        assert!(!exists(&store, ReferenceKind::FeaturedImage, 1, "").await);
        assert!(!store.delete_asset(id(1)).await.unwrap());
        assert!(!store.delete_asset(id(10)).await.unwrap());
    }

    #[tokio::test]
    async fn unavailable_store_errors() {
        let store = MemoryContentStore::new();
        store.set_unavailable(true);
        let err = store.list_asset_ids().await.unwrap_err();
        assert!(err.is_store_unavailable());
    }
}
