use std::time::Duration;

use async_trait::async_trait;
use mediasweep_core::constants::REST_MEDIA_ROUTE;
use mediasweep_core::{AppError, AssetId, StoreConfig};
use reqwest::StatusCode;
use serde::Deserialize;

use super::AssetDeleter;

/// Deletes attachments with `DELETE /wp-json/wp/v2/media/{id}?force=true`.
///
/// Authenticates with a WordPress application password. `force=true` skips the
/// trash, which attachments do not support anyway.
#[derive(Clone)]
pub struct RestDeleter {
    client: reqwest::Client,
    site_url: String,
    username: String,
    app_password: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    deleted: bool,
}

impl RestDeleter {
    pub fn new(
        site_url: impl Into<String>,
        username: impl Into<String>,
        app_password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            app_password: app_password.into(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, AppError> {
        let missing = |name: &str| AppError::Config(format!("{} is required for REST deletion", name));
        Self::new(
            config.wp_site_url.clone().ok_or_else(|| missing("WP_SITE_URL"))?,
            config.wp_rest_user.clone().ok_or_else(|| missing("WP_REST_USER"))?,
            config
                .wp_app_password
                .clone()
                .ok_or_else(|| missing("WP_APP_PASSWORD"))?,
            Duration::from_secs(config.rest_timeout_seconds),
        )
    }

    fn media_url(&self, id: AssetId) -> String {
        format!("{}{}/{}?force=true", self.site_url, REST_MEDIA_ROUTE, id)
    }
}

#[async_trait]
impl AssetDeleter for RestDeleter {
    #[tracing::instrument(skip(self), fields(http.method = "DELETE", asset_id = %id))]
    async fn delete(&self, id: AssetId) -> Result<bool, AppError> {
        let response = self
            .client
            .delete(self.media_url(id))
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await
            .map_err(|e| AppError::Deletion(format!("Request for attachment {} failed: {}", id, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            tracing::debug!(status = %status, "Attachment already gone");
            return Ok(false);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "WordPress refused attachment deletion");
            return Err(AppError::Deletion(format!(
                "WordPress returned {} for attachment {}",
                status, id
            )));
        }

        let body: DeleteResponse = response.json().await.map_err(|e| {
            AppError::Deletion(format!("Unreadable delete response for attachment {}: {}", id, e))
        })?;

        if body.deleted {
            Ok(true)
        } else {
            Err(AppError::Deletion(format!(
                "WordPress did not delete attachment {}",
                id
            )))
        }
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}
