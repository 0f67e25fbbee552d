//! Pipeline constants
//!
//! Centralized location for the defaults shared across crates.

// Request defaults
pub const DEFAULT_RETRIES: u32 = 3;

// Continuation key paths
pub const DEFAULT_PAGING_KEY_PATH: &str = "paging";
pub const DEFAULT_SCROLL_KEY_PATH: &str = "scroll_id";

// Authorization
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer";

/// Lifetime assumed for identity-endpoint tokens that do not report
/// `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 900;

// HTTP transport
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("extraction-pipeline/", env!("CARGO_PKG_VERSION"));

// Database
pub const DEFAULT_DB_PATH: &str = "extractions.sqlite";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
