use mediasweep_core::AppError;

/// Fully prefixed names of the WordPress tables this crate touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WpTables {
    pub posts: String,
    pub postmeta: String,
    pub termmeta: String,
    pub usermeta: String,
    pub term_relationships: String,
    pub comments: String,
    pub commentmeta: String,
}

impl WpTables {
    /// Table names are interpolated into SQL, so the prefix is restricted to `[A-Za-z0-9_]`.
    pub fn new(prefix: &str) -> Result<Self, AppError> {
        if prefix.is_empty()
            || !prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Config(format!(
                "Invalid table prefix '{}'",
                prefix
            )));
        }

        Ok(WpTables {
            posts: format!("{prefix}posts"),
            postmeta: format!("{prefix}postmeta"),
            termmeta: format!("{prefix}termmeta"),
            usermeta: format!("{prefix}usermeta"),
            term_relationships: format!("{prefix}term_relationships"),
            comments: format!("{prefix}comments"),
            commentmeta: format!("{prefix}commentmeta"),
        })
    }
}
