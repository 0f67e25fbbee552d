//! Password-grant token provider
//!
//! Authenticates configured accounts against a token endpoint that accepts
//! `password` and `refresh_token` grants as JSON bodies.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use extraction_core::ports::{RequestTransport, TokenProvider};
use extraction_domain::{
    AccessToken, ApiResponse, AuthConfig, ExtractionError, Request, RequestMethod, Result,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// [`TokenProvider`] for OAuth-style password grants.
///
/// Each grant is a single POST through the shared transport. Any failure,
/// including network errors and malformed token responses, surfaces as
/// [`ExtractionError::Auth`].
pub struct PasswordGrantTokenProvider {
    transport: Arc<dyn RequestTransport>,
    config: AuthConfig,
}

impl PasswordGrantTokenProvider {
    pub fn new(transport: Arc<dyn RequestTransport>, config: AuthConfig) -> Self {
        Self { transport, config }
    }

    /// Identifiers that have credentials configured.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.config.accounts.keys().map(String::as_str)
    }

    async fn grant(&self, body: Value) -> Result<AccessToken> {
        if self.config.token_url.is_empty() {
            return Err(ExtractionError::Auth("no token endpoint configured".into()));
        }

        let request = Request::builder(RequestMethod::Post, self.config.token_url.as_str())
            .body(body)
            .retries(1)
            .build();

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|err| ExtractionError::Auth(format!("token endpoint unreachable: {err}")))?;

        self.parse_token(&response)
    }

    fn parse_token(&self, response: &ApiResponse) -> Result<AccessToken> {
        if !response.is_success() {
            return Err(ExtractionError::Auth(format!(
                "token endpoint rejected credentials (HTTP {})",
                response.status_code
            )));
        }

        let access_token = required_str(&response.content, "access_token")?;
        let refresh_token = required_str(&response.content, "refresh_token")?;
        let life_time = response
            .content
            .get("expires_in")
            .and_then(seconds)
            .unwrap_or(self.config.token_lifetime_secs);

        debug!(life_time, "token granted");
        Ok(AccessToken::new(access_token, refresh_token, life_time, Utc::now()))
    }
}

#[async_trait]
impl TokenProvider for PasswordGrantTokenProvider {
    #[instrument(skip(self))]
    async fn auth(&self, identifier: &str) -> Result<AccessToken> {
        let account = self.config.accounts.get(identifier).ok_or_else(|| {
            ExtractionError::Auth(format!("no credentials configured for '{identifier}'"))
        })?;

        self.grant(json!({
            "username": account.username,
            "password": account.password,
            "grant_type": "password",
        }))
        .await
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, identifier: &str, refresh_token: &str) -> Result<AccessToken> {
        self.grant(json!({
            "refresh_token": refresh_token,
            "grant_type": "refresh_token",
        }))
        .await
    }
}

fn required_str<'a>(content: &'a Value, field: &str) -> Result<&'a str> {
    content
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ExtractionError::Auth(format!("token response missing '{field}'")))
}

/// `expires_in` as reported by the endpoint; some servers send it as text.
fn seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
