//! Shared constants and defaults

/// Lifetime assumed for an access token whose expiry cannot be read.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
/// Lifetime assumed for a refresh token whose expiry cannot be read.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 0;

pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

// IAM endpoints, relative to the IAM base URL
pub const LOGIN_WITH_KEY_PATH: &str = "/auth/login/key";
pub const REFRESH_TOKEN_PATH: &str = "/auth/token/refresh";

// Catalogue resources
pub const RESOURCE_WORKS: &str = "works";
pub const RESOURCE_PEOPLE: &str = "people";
pub const RESOURCE_ARTICLES: &str = "articles";
