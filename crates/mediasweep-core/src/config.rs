//! Configuration module
//!
//! Configuration is read from environment variables (a `.env` file is loaded first
//! when present). [`StoreConfig`] covers everything needed to reach the WordPress
//! database and delete attachments, and is all the CLI needs. [`Config`] adds the
//! HTTP server, actor keys and anti-replay token settings on top of it.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DEFAULT_TABLE_PREFIX, ELEMENTOR_DATA_META_KEY};

// Common constants
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REST_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 4000;
/// WordPress nonces live 12-24 hours; tokens here expire after the lower bound.
const NONCE_TTL_SECS: u64 = 43_200;
const MIN_SECRET_LEN: usize = 32;

/// How attachments are deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteBackend {
    /// Through the WordPress REST API (`DELETE /wp/v2/media/{id}?force=true`).
    Rest,
    /// Directly in the database, then the files from the uploads directory.
    Database,
}

impl FromStr for DeleteBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(DeleteBackend::Rest),
            "database" | "db" => Ok(DeleteBackend::Database),
            other => Err(anyhow::anyhow!(
                "DELETE_BACKEND must be 'rest' or 'database', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for DeleteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteBackend::Rest => write!(f, "rest"),
            DeleteBackend::Database => write!(f, "database"),
        }
    }
}

/// Console log format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Settings for reaching the WordPress database and deleting attachments.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub table_prefix: String,
    /// Public base URL of the uploads directory, e.g. `https://example.com/wp-content/uploads`.
    pub uploads_base_url: Option<String>,
    /// Post meta keys holding page-builder layout JSON.
    pub page_builder_meta_keys: Vec<String>,
    pub delete_backend: DeleteBackend,
    pub wp_site_url: Option<String>,
    pub wp_rest_user: Option<String>,
    pub wp_app_password: Option<String>,
    pub rest_timeout_seconds: u64,
    pub uploads_dir: Option<PathBuf>,
}

/// Base configuration of the HTTP server
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: LogFormat,
}

/// Full server configuration
#[derive(Clone, Debug)]
pub struct SweepConfig {
    pub base: BaseConfig,
    pub store: StoreConfig,
    pub admin_api_key: String,
    pub editor_api_key: Option<String>,
    pub nonce_secret: String,
    pub nonce_ttl_secs: u64,
}

/// Application configuration (server).
#[derive(Clone, Debug)]
pub struct Config(pub Box<SweepConfig>);

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let page_builder_meta_keys = lookup("PAGE_BUILDER_META_KEYS")
            .unwrap_or_else(|| ELEMENTOR_DATA_META_KEY.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let delete_backend = match non_empty(&lookup, "DELETE_BACKEND") {
            Some(value) => value.parse()?,
            None => DeleteBackend::Rest,
        };

        let config = StoreConfig {
            database_url: non_empty(&lookup, "DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            table_prefix: non_empty(&lookup, "TABLE_PREFIX")
                .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string()),
            uploads_base_url: non_empty(&lookup, "UPLOADS_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string()),
            page_builder_meta_keys,
            delete_backend,
            wp_site_url: non_empty(&lookup, "WP_SITE_URL")
                .map(|s| s.trim_end_matches('/').to_string()),
            wp_rest_user: non_empty(&lookup, "WP_REST_USER"),
            wp_app_password: non_empty(&lookup, "WP_APP_PASSWORD"),
            rest_timeout_seconds: parse_or(&lookup, "REST_TIMEOUT_SECONDS", REST_TIMEOUT_SECS),
            uploads_dir: non_empty(&lookup, "UPLOADS_DIR").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("mysql://")
            || self.database_url.starts_with("mariadb://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid MySQL connection string"
            ));
        }

        if self.table_prefix.is_empty()
            || !self
                .table_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(anyhow::anyhow!(
                "TABLE_PREFIX may only contain letters, digits and underscores"
            ));
        }

        if self.page_builder_meta_keys.is_empty() {
            return Err(anyhow::anyhow!(
                "PAGE_BUILDER_META_KEYS must name at least one meta key"
            ));
        }

        match self.delete_backend {
            DeleteBackend::Rest => {
                if self.wp_site_url.is_none()
                    || self.wp_rest_user.is_none()
                    || self.wp_app_password.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "WP_SITE_URL, WP_REST_USER and WP_APP_PASSWORD must be set when using the rest delete backend"
                    ));
                }
            }
            DeleteBackend::Database => {
                if self.uploads_dir.is_none() {
                    return Err(anyhow::anyhow!(
                        "UPLOADS_DIR must be set when using the database delete backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Config {
    fn as_sweep(&self) -> &SweepConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let config = SweepConfig::from_lookup(&lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_sweep().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_sweep().base.environment)
    }

    pub fn store(&self) -> &StoreConfig {
        &self.as_sweep().store
    }

    pub fn server_port(&self) -> u16 {
        self.as_sweep().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_sweep().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_sweep().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_sweep().base.log_format
    }

    pub fn admin_api_key(&self) -> &str {
        &self.as_sweep().admin_api_key
    }

    pub fn editor_api_key(&self) -> Option<&str> {
        self.as_sweep().editor_api_key.as_deref()
    }

    pub fn nonce_secret(&self) -> &str {
        &self.as_sweep().nonce_secret
    }

    pub fn nonce_ttl_secs(&self) -> u64 {
        self.as_sweep().nonce_ttl_secs
    }
}

impl SweepConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let environment = non_empty(lookup, "ENVIRONMENT")
            .or_else(|| non_empty(lookup, "APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: match lookup("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => SERVER_PORT,
            },
            cors_origins,
            environment,
            log_format: LogFormat::parse(&lookup("LOG_FORMAT").unwrap_or_default()),
        };

        let config = SweepConfig {
            base,
            store: StoreConfig::from_lookup(lookup)?,
            admin_api_key: non_empty(lookup, "ADMIN_API_KEY")
                .ok_or_else(|| anyhow::anyhow!("ADMIN_API_KEY must be set for authentication"))?,
            editor_api_key: non_empty(lookup, "EDITOR_API_KEY"),
            nonce_secret: non_empty(lookup, "NONCE_SECRET")
                .ok_or_else(|| anyhow::anyhow!("NONCE_SECRET must be set"))?,
            nonce_ttl_secs: parse_or(lookup, "NONCE_TTL_SECS", NONCE_TTL_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.admin_api_key.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "ADMIN_API_KEY must be at least 32 characters long"
            ));
        }

        if let Some(editor_key) = &self.editor_api_key {
            if editor_key.len() < MIN_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "EDITOR_API_KEY must be at least 32 characters long"
                ));
            }
            if editor_key == &self.admin_api_key {
                return Err(anyhow::anyhow!(
                    "EDITOR_API_KEY must differ from ADMIN_API_KEY"
                ));
            }
        }

        if self.nonce_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "NONCE_SECRET must be at least 32 characters long"
            ));
        }

        if self.nonce_ttl_secs == 0 {
            return Err(anyhow::anyhow!("NONCE_TTL_SECS must be greater than zero"));
        }

        self.store.validate()
    }
}
