//! Recorded outcomes: responses, attempts and extractions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::request::Request;
use crate::impl_domain_status_conversions;

/// Status code and best-effort parsed body of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status_code: u16,
    /// Parsed JSON body; an empty object when the body was absent or could
    /// not be parsed.
    pub content: Value,
}

impl ApiResponse {
    pub fn new(status_code: u16, content: Value) -> Self {
        Self { status_code, content }
    }

    /// Response whose body could not be parsed.
    pub fn empty(status_code: u16) -> Self {
        Self::new(status_code, empty_content())
    }

    /// Parse `body` as JSON, degrading to empty content on failure.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        let content = serde_json::from_slice(body).unwrap_or_else(|_| empty_content());
        Self::new(status_code, content)
    }

    /// 200, 201 and 204 are accepted as success by identity endpoints.
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, 200 | 201 | 204)
    }
}

/// Empty JSON object used wherever a body is missing.
pub fn empty_content() -> Value {
    Value::Object(Map::new())
}

/// One physical execution of a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub fetched_at: DateTime<Utc>,
    pub response: ApiResponse,
    /// Transport failure description when no HTTP response was obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Attempt {
    pub fn new(fetched_at: DateTime<Utc>, response: ApiResponse) -> Self {
        Self { fetched_at, response, error: None }
    }

    /// Attempt that never reached the server. Recorded with status code 0.
    pub fn transport_failure(fetched_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self { fetched_at, response: ApiResponse::empty(0), error: Some(error.into()) }
    }

    pub fn success(&self) -> bool {
        self.response.status_code == 200
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    Error,
}

impl_domain_status_conversions!(ExtractionStatus {
    Success => "success",
    Error => "error",
});

/// Complete record of one logical fetch.
///
/// Attempts are kept in chronological order. The status is derived from
/// them on demand, so it can never disagree with the recorded attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    request: Request,
    attempts: Vec<Attempt>,
}

impl Extraction {
    pub fn new(request: Request, attempts: Vec<Attempt>) -> Self {
        Self { request, attempts }
    }

    /// The request that was actually executed (including credentials).
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// `Success` iff at least one attempt succeeded.
    pub fn status(&self) -> ExtractionStatus {
        if self.attempts.iter().any(Attempt::success) {
            ExtractionStatus::Success
        } else {
            ExtractionStatus::Error
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == ExtractionStatus::Success
    }

    /// Body of the first successful attempt, if any.
    pub fn successful_content(&self) -> Option<&Value> {
        self.attempts.iter().find(|attempt| attempt.success()).map(|attempt| &attempt.response.content)
    }

    /// Body of the first successful attempt, or an empty object.
    pub fn data(&self) -> Value {
        self.successful_content().cloned().unwrap_or_else(empty_content)
    }

    /// Number of physical calls made.
    pub fn retries(&self) -> usize {
        self.attempts.len()
    }

    /// Timestamp of the most recent attempt.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.attempts.last().map(|attempt| attempt.fetched_at)
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    pub fn into_parts(self) -> (Request, Vec<Attempt>) {
        (self.request, self.attempts)
    }
}
