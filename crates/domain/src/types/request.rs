//! The unit of work executed by the pipeline

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::token::AccessToken;
use crate::constants::{AUTHORIZATION_HEADER, DEFAULT_RETRIES};

/// HTTP verb of a [`Request`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(format!("Invalid RequestMethod: {s}")),
        }
    }
}

/// Immutable description of one logical call.
///
/// A `Request` is never modified after construction. Attaching credentials
/// or advancing a continuation produces a new value through the `with_*`
/// helpers, which copy every other field, including [`Request::id`], so any
/// derived request can be traced back to the one it started from.
///
/// Header names are case-insensitive: setting a header replaces any existing
/// entry whose name differs only in case.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    id: Uuid,
    url: String,
    method: RequestMethod,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, Value>,
    body: Option<Value>,
    retries: u32,
    backoff: Option<Duration>,
    identity: Option<String>,
    created_at: DateTime<Utc>,
}

impl Request {
    /// Start building a request.
    pub fn builder(method: RequestMethod, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Plain GET with default settings.
    pub fn get(url: impl Into<String>) -> Self {
        Self::builder(RequestMethod::Get, url).build()
    }

    /// POST carrying a JSON body.
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::builder(RequestMethod::Post, url).body(body).build()
    }

    /// Identifier shared by this request and every request derived from it.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Value of the header called `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Query parameters
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Maximum number of physical calls (always at least 1).
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn backoff(&self) -> Option<Duration> {
        self.backoff
    }

    /// Credential identifier to authenticate as, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Query parameters rendered as text pairs.
    ///
    /// Strings are used verbatim, other scalars through their JSON form.
    /// `null` parameters are omitted.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }

    /// Copy of this request with `name` set to `value`, replacing every
    /// header whose name matches regardless of case.
    #[must_use]
    pub fn with_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        set_header(&mut next.headers, name.into(), value.into());
        next
    }

    /// Copy of this request carrying `token` in the `Authorization` header.
    #[must_use]
    pub fn with_authorization(&self, token: &AccessToken) -> Self {
        let (name, value) = token.authorization_header();
        self.with_header(name, value)
    }

    /// Copy of this request with its query parameters replaced.
    #[must_use]
    pub fn with_params(&self, params: BTreeMap<String, Value>) -> Self {
        let mut next = self.clone();
        next.params = params;
        next
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(key, value)| {
                let shown = if key.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                    "<redacted>"
                } else {
                    value.as_str()
                };
                (key.as_str(), shown)
            })
            .collect();

        f.debug_struct("Request")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &headers)
            .field("params", &self.params)
            .field("body", &self.body)
            .field("retries", &self.retries)
            .field("backoff", &self.backoff)
            .field("identity", &self.identity)
            .field("created_at", &self.created_at)
            .finish()
    }
}

fn set_header(headers: &mut BTreeMap<String, String>, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// Fluent constructor for [`Request`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: String,
    method: RequestMethod,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, Value>,
    body: Option<Value>,
    retries: u32,
    backoff: Option<Duration>,
    identity: Option<String>,
}

impl RequestBuilder {
    fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            body: None,
            retries: DEFAULT_RETRIES,
            backoff: None,
            identity: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Total number of attempts; values below 1 are raised to 1.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Delay between consecutive failed attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Authenticate the request as `identifier`.
    pub fn identity(mut self, identifier: impl Into<String>) -> Self {
        self.identity = Some(identifier.into());
        self
    }

    pub fn build(self) -> Request {
        Request {
            id: Uuid::now_v7(),
            url: self.url,
            method: self.method,
            headers: self.headers,
            params: self.params,
            body: self.body,
            retries: self.retries.max(1),
            backoff: self.backoff,
            identity: self.identity,
            created_at: Utc::now(),
        }
    }
}
