//! Port interfaces for the extraction pipeline
//!
//! These traits define the boundaries between the orchestration logic
//! and infrastructure implementations.

use async_trait::async_trait;
use extraction_domain::{AccessToken, ApiResponse, Extraction, Request, Result};

/// Authenticates against an identity endpoint
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Full credential-based authentication for `identifier`
    async fn auth(&self, identifier: &str) -> Result<AccessToken>;

    /// Exchange a refresh credential for a new token
    async fn refresh(&self, identifier: &str, refresh_token: &str) -> Result<AccessToken>;
}

/// Durable storage of one token per identifier
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn get(&self, identifier: &str) -> Result<Option<AccessToken>>;

    /// Store `token`, replacing any prior entry for `identifier`
    async fn save(&self, identifier: &str, token: &AccessToken) -> Result<()>;
}

/// Performs one physical call for a [`Request`]
///
/// Implementations parse the body best-effort: an unparseable body yields
/// empty content, not an error. `Err` is reserved for calls that produced no
/// HTTP response at all.
#[async_trait]
pub trait RequestTransport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<ApiResponse>;
}

/// Records completed extractions
#[async_trait]
pub trait ExtractionStore: Send + Sync {
    async fn save(&self, extraction: &Extraction) -> Result<()>;
}
