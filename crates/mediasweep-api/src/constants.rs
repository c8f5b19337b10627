//! API constants

/// API version segment of every route
pub const API_VERSION: &str = "v0";

/// Prefix of every versioned route
pub const API_PREFIX: &str = "/api/v0";

/// Upper bound for request bodies; a delete request is a list of ids
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Timeout of the store check behind `/health`
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Server-wide cap on in-flight requests
pub const MAX_CONCURRENT_REQUESTS: usize = 256;
