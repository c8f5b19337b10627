use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use mediasweep_core::constants::{
    ATTACHED_FILE_META_KEY, ATTACHMENT_METADATA_META_KEY, ATTACHMENT_POST_TYPE,
    THUMBNAIL_META_KEY,
};
use mediasweep_core::{AppError, AssetId};
use regex::Regex;
use sqlx::{MySql, MySqlPool};

use super::AssetDeleter;
use crate::db::tables::WpTables;

/// `file` and `original_image` entries of a PHP-serialized `_wp_attachment_metadata`.
static METADATA_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"s:\d+:"(file|original_image)";s:\d+:"([^"]*)";"#).expect("valid regex")
});

/// Deletes attachments straight from the database, then their files from disk.
///
/// Rows go in one transaction: featured-image links to the attachment, its term
/// relationships, its comments, its meta and the post row. Files are removed only
/// after commit; a missing file is ignored and other I/O failures are logged.
#[derive(Clone)]
pub struct DatabaseDeleter {
    pool: MySqlPool,
    tables: WpTables,
    uploads_dir: PathBuf,
}

impl DatabaseDeleter {
    pub fn new(pool: MySqlPool, tables: WpTables, uploads_dir: PathBuf) -> Self {
        Self {
            pool,
            tables,
            uploads_dir,
        }
    }

    async fn remove_files(&self, id: AssetId, files: &[PathBuf]) {
        for relative in files {
            let path = self.uploads_dir.join(relative);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(asset_id = %id, path = %path.display(), "Removed file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    asset_id = %id,
                    path = %path.display(),
                    error = %e,
                    "Failed to remove attachment file"
                ),
            }
        }
    }
}

#[async_trait]
impl AssetDeleter for DatabaseDeleter {
    #[tracing::instrument(skip(self), fields(db.system = "mysql", db.table = "posts", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: AssetId) -> Result<bool, AppError> {
        let t = &self.tables;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<MySql, (String, Option<String>, Option<String>)>(&format!(
            "SELECT p.post_type, \
             (SELECT meta_value FROM {pm} WHERE post_id = p.ID AND meta_key = ? LIMIT 1), \
             (SELECT meta_value FROM {pm} WHERE post_id = p.ID AND meta_key = ? LIMIT 1) \
             FROM {p} p WHERE p.ID = ? FOR UPDATE",
            pm = t.postmeta,
            p = t.posts
        ))
        .bind(ATTACHED_FILE_META_KEY)
        .bind(ATTACHMENT_METADATA_META_KEY)
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await?;

        let (attached_file, metadata) = match row {
            Some((post_type, attached_file, metadata)) if post_type == ATTACHMENT_POST_TYPE => {
                (attached_file, metadata)
            }
            _ => {
                tx.rollback().await?;
                return Ok(false);
            }
        };

        sqlx::query(&format!(
            "DELETE FROM {} WHERE meta_key = ? AND meta_value = ?",
            t.postmeta
        ))
        .bind(THUMBNAIL_META_KEY)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "DELETE FROM {} WHERE object_id = ?",
            t.term_relationships
        ))
        .bind(id.get())
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "DELETE cm FROM {cm} cm INNER JOIN {c} c ON cm.comment_id = c.comment_ID \
             WHERE c.comment_post_ID = ?",
            cm = t.commentmeta,
            c = t.comments
        ))
        .bind(id.get())
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!("DELETE FROM {} WHERE comment_post_ID = ?", t.comments))
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!("DELETE FROM {} WHERE post_id = ?", t.postmeta))
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query(&format!("DELETE FROM {} WHERE ID = ?", t.posts))
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if let Some(attached_file) = attached_file {
            let files = attachment_files(&attached_file, metadata.as_deref());
            self.remove_files(id, &files).await;
        }

        Ok(deleted > 0)
    }

    fn backend(&self) -> &'static str {
        "database"
    }
}

/// Files of an attachment, relative to the uploads directory.
///
/// Resized copies and the pre-scaling original sit next to the attached file, so
/// their bare names are joined to its directory. Absolute paths and paths leaving
/// the uploads directory are dropped.
pub fn attachment_files(attached_file: &str, metadata: Option<&str>) -> Vec<PathBuf> {
    let attached = Path::new(attached_file);
    let dir = attached.parent().unwrap_or_else(|| Path::new(""));

    let mut files = vec![attached.to_path_buf()];
    if let Some(metadata) = metadata {
        for caps in METADATA_FILE_RE.captures_iter(metadata) {
            let name = &caps[2];
            let path = if name.contains('/') {
                PathBuf::from(name)
            } else {
                dir.join(name)
            };
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    files.retain(|path| is_contained(path));
    files
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"a:6:{s:5:"width";i:2560;s:6:"height";i:1707;s:4:"file";s:23:"2024/05/cat-scaled.jpg";s:5:"sizes";a:2:{s:9:"thumbnail";a:4:{s:4:"file";s:19:"cat-150x150.jpg";s:5:"width";i:150;s:6:"height";i:150;s:9:"mime-type";s:10:"image/jpeg";}s:6:"medium";a:4:{s:4:"file";s:19:"cat-300x200.jpg";s:5:"width";i:300;s:6:"height";i:200;s:9:"mime-type";s:10:"image/jpeg";}}s:14:"original_image";s:7:"cat.jpg";}"#;

    #[test]
    fn collects_original_sizes_and_unscaled_image() {
        let files = attachment_files("2024/05/cat-scaled.jpg", Some(METADATA));
        assert_eq!(
            files,
            vec![
                PathBuf::from("2024/05/cat-scaled.jpg"),
                PathBuf::from("2024/05/cat-150x150.jpg"),
                PathBuf::from("2024/05/cat-300x200.jpg"),
                PathBuf::from("2024/05/cat.jpg"),
            ]
        );
    }

    #[test]
    fn without_metadata_only_the_attached_file() {
        assert_eq!(
            attachment_files("doc.pdf", None),
            vec![PathBuf::from("doc.pdf")]
        );
    }

    #[test]
    fn drops_paths_escaping_uploads() {
        let metadata = r#"a:1:{s:5:"sizes";a:1:{s:5:"thumb";a:1:{s:4:"file";s:12:"../../x.php";}}}"#;
        let files = attachment_files("/etc/passwd", Some(metadata));
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn removing_files_ignores_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("2024/05")).unwrap();
        std::fs::write(dir.path().join("2024/05/cat.jpg"), b"jpeg").unwrap();
        std::fs::write(dir.path().join("2024/05/cat-150x150.jpg"), b"jpeg").unwrap();

        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .connect_lazy("mysql://wp:wp@127.0.0.1/wordpress")
            .unwrap();
        let deleter = DatabaseDeleter::new(
            pool,
            WpTables::new("wp_").unwrap(),
            dir.path().to_path_buf(),
        );

        let files = vec![
            PathBuf::from("2024/05/cat.jpg"),
            PathBuf::from("2024/05/cat-150x150.jpg"),
            PathBuf::from("2024/05/cat-300x200.jpg"),
        ];
        deleter.remove_files(AssetId::new(5).unwrap(), &files).await;

        assert!(!dir.path().join("2024/05/cat.jpg").exists());
        assert!(!dir.path().join("2024/05/cat-150x150.jpg").exists());
    }

    #[tokio::test]
    async fn unreachable_database_fails_before_touching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.pdf"), b"pdf").unwrap();

        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(1))
            .connect_lazy("mysql://wp:wp@127.0.0.1:1/wordpress")
            .unwrap();
        let deleter = DatabaseDeleter::new(
            pool,
            WpTables::new("wp_").unwrap(),
            dir.path().to_path_buf(),
        );

        let err = deleter.delete(AssetId::new(5).unwrap()).await.unwrap_err();

        assert!(err.is_store_unavailable());
        assert!(dir.path().join("doc.pdf").exists());
    }
}
