//! Bearer credentials

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{AUTHORIZATION_HEADER, BEARER_PREFIX};

/// Immutable access token with its refresh credential and validity window.
///
/// Produced by a token provider, stored by a token cache and attached to
/// outgoing requests. Fields are private so a token cannot be altered after
/// it has been issued; use [`AccessToken::new`] to build one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    value: String,
    refresh_token: String,
    life_time: u64,
    obtained_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token valid for `life_time` seconds from `obtained_at`.
    #[must_use]
    pub fn new(
        value: impl Into<String>,
        refresh_token: impl Into<String>,
        life_time: u64,
        obtained_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value: value.into(),
            refresh_token: refresh_token.into(),
            life_time,
            obtained_at,
        }
    }

    /// Bearer credential string
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Refresh credential; empty when the issuer did not provide one.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Validity in seconds
    pub fn life_time(&self) -> u64 {
        self.life_time
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    /// `obtained_at + life_time`
    pub fn expires_at(&self) -> DateTime<Utc> {
        let seconds = i64::try_from(self.life_time).unwrap_or(i64::MAX);
        Duration::try_seconds(seconds)
            .and_then(|lifetime| self.obtained_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the token is expired at the given instant (`now >= expires_at`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// `Authorization` header name and value carrying this token.
    pub fn authorization_header(&self) -> (&'static str, String) {
        (AUTHORIZATION_HEADER, format!("{BEARER_PREFIX} {}", self.value))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("has_refresh_token", &self.has_refresh_token())
            .field("life_time", &self.life_time)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}
