use std::time::Duration;

use async_trait::async_trait;
use extraction_core::ports::RequestTransport;
use extraction_domain::{ApiResponse, HttpConfig, Request, RequestMethod, Result};
use reqwest::{Client as ReqwestClient, Method};
use tracing::{debug, warn};

use crate::errors::to_domain;

/// reqwest-backed transport.
///
/// Performs exactly one call per [`RequestTransport::send`]; retries and
/// backoff belong to the executor. Any HTTP status is a response, not an
/// error. Only calls that never produced a response fail.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Client configured from the `[http]` section.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::builder().timeout(config.timeout()).user_agent(config.user_agent.clone()).build()
    }

    fn prepare(&self, request: &Request) -> reqwest::RequestBuilder {
        let method = match request.method() {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
        };

        let mut builder = self.client.request(method, request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        builder
    }
}

#[async_trait]
impl RequestTransport for HttpClient {
    async fn send(&self, request: &Request) -> Result<ApiResponse> {
        debug!(method = %request.method(), url = request.url(), "sending HTTP request");

        let response = self.prepare(request).send().await.map_err(to_domain)?;
        let status = response.status().as_u16();
        debug!(status, url = request.url(), "received HTTP response");

        match response.bytes().await {
            Ok(body) => Ok(ApiResponse::from_body(status, &body)),
            Err(err) => {
                warn!(status, error = %err, "failed to read response body");
                Ok(ApiResponse::empty(status))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    accept_invalid_certs: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: HttpConfig::default().timeout(),
            user_agent: None,
            default_headers: None,
            accept_invalid_certs: false,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Test-only helper to allow insecure TLS (e.g., self-signed certs).
    #[cfg(test)]
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(to_domain)?;
        Ok(HttpClient { client })
    }
}
