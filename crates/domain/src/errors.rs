//! Error types used throughout the pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the extraction pipeline
///
/// Transport failures are deliberately absent: a call that never produced a
/// response is recorded as a failed `Attempt`, not raised.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ExtractionError {
    /// No valid credential could be obtained (cache, refresh and reauth all
    /// exhausted), or the identity endpoint rejected the credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An extraction could not be recorded.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractionError {
    /// Stable label suitable for structured logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Persistence(_) => "persistence",
            Self::Database(_) => "database",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ExtractionError>;
