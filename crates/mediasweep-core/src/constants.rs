//! WordPress schema constants used by the reference checks and deleters.

/// Default table prefix of a WordPress install (`$table_prefix` in wp-config.php).
pub const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// Post type of media library entries.
pub const ATTACHMENT_POST_TYPE: &str = "attachment";

/// Post status every attachment carries.
pub const ATTACHMENT_POST_STATUS: &str = "inherit";

/// Post type of historical revision copies. Revisions never count as live references.
pub const REVISION_POST_TYPE: &str = "revision";

/// Post meta key holding the featured image id.
pub const THUMBNAIL_META_KEY: &str = "_thumbnail_id";

/// Post meta key holding the attachment path relative to the uploads directory.
pub const ATTACHED_FILE_META_KEY: &str = "_wp_attached_file";

/// Post meta key holding the serialized attachment metadata (sizes, original image).
pub const ATTACHMENT_METADATA_META_KEY: &str = "_wp_attachment_metadata";

/// Elementor layout data, the default page-builder meta key.
pub const ELEMENTOR_DATA_META_KEY: &str = "_elementor_data";

/// REST route used for attachment deletion.
pub const REST_MEDIA_ROUTE: &str = "/wp-json/wp/v2/media";
