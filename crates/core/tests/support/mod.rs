//! Shared test helpers for `extraction-core` integration tests.
//!
//! Lightweight in-memory mocks for every port so the tests can focus on
//! orchestration behaviour instead of boilerplate.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use extraction_core::ports::{ExtractionStore, RequestTransport, TokenCache, TokenProvider};
use extraction_core::ExtractionService;
use extraction_domain::{
    AccessToken, ApiResponse, Extraction, ExtractionError, Request, Result as DomainResult,
};

/// Token obtained `age` ago that lives for `life_time` seconds.
pub fn token_aged(value: &str, refresh: &str, life_time: u64, age: Duration) -> AccessToken {
    let obtained_at: DateTime<Utc> = Utc::now() - age;
    AccessToken::new(value, refresh, life_time, obtained_at)
}

/// Token provider returning scripted results and counting calls.
#[derive(Default)]
pub struct MockTokenProvider {
    auth_results: Mutex<VecDeque<DomainResult<AccessToken>>>,
    refresh_results: Mutex<VecDeque<DomainResult<AccessToken>>>,
    pub auth_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub refreshed_with: Mutex<Vec<String>>,
}

impl MockTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth(self, result: DomainResult<AccessToken>) -> Self {
        self.auth_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_refresh(self, result: DomainResult<AccessToken>) -> Self {
        self.refresh_results.lock().unwrap().push_back(result);
        self
    }

    pub fn auth_count(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn auth(&self, identifier: &str) -> DomainResult<AccessToken> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers can interleave.
        tokio::task::yield_now().await;
        self.auth_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExtractionError::Auth(format!("no credentials for {identifier}"))))
    }

    async fn refresh(&self, _identifier: &str, refresh_token: &str) -> DomainResult<AccessToken> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refreshed_with.lock().unwrap().push(refresh_token.to_string());
        self.refresh_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExtractionError::Auth("refresh token revoked".into())))
    }
}

/// In-memory token cache that counts writes.
#[derive(Default)]
pub struct MockTokenCache {
    tokens: Mutex<HashMap<String, AccessToken>>,
    pub saves: AtomicUsize,
    pub fail_reads: bool,
}

impl MockTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, identifier: &str, token: AccessToken) -> Self {
        self.tokens.lock().unwrap().insert(identifier.to_string(), token);
        self
    }

    pub fn failing() -> Self {
        Self { fail_reads: true, ..Self::default() }
    }

    pub fn stored(&self, identifier: &str) -> Option<AccessToken> {
        self.tokens.lock().unwrap().get(identifier).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenCache for MockTokenCache {
    async fn get(&self, identifier: &str) -> DomainResult<Option<AccessToken>> {
        if self.fail_reads {
            return Err(ExtractionError::Database("cache unavailable".into()));
        }
        Ok(self.stored(identifier))
    }

    async fn save(&self, identifier: &str, token: &AccessToken) -> DomainResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().insert(identifier.to_string(), token.clone());
        Ok(())
    }
}

type Responder = dyn Fn(&Request) -> DomainResult<ApiResponse> + Send + Sync;

/// Transport that answers from a script, then from a fallback responder,
/// recording every request it sees.
pub struct MockTransport {
    script: Mutex<VecDeque<DomainResult<ApiResponse>>>,
    fallback: Box<Responder>,
    pub sent: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Answer the scripted responses in order, then 500s.
    pub fn scripted(responses: Vec<DomainResult<ApiResponse>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            fallback: Box::new(|_| Ok(ApiResponse::empty(500))),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request through `responder`.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> DomainResult<ApiResponse> + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Box::new(responder),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl RequestTransport for MockTransport {
    async fn send(&self, request: &Request) -> DomainResult<ApiResponse> {
        self.sent.lock().unwrap().push(request.clone());
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| (self.fallback)(request))
    }
}

/// Extraction store keeping everything it is given.
#[derive(Default)]
pub struct MockExtractionStore {
    pub saved: Mutex<Vec<Extraction>>,
    pub fail: bool,
}

impl MockExtractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn saved(&self) -> Vec<Extraction> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionStore for MockExtractionStore {
    async fn save(&self, extraction: &Extraction) -> DomainResult<()> {
        self.saved.lock().unwrap().push(extraction.clone());
        if self.fail {
            return Err(ExtractionError::Persistence("disk full".into()));
        }
        Ok(())
    }
}

/// Fully mocked service plus handles on each mock.
pub struct Harness {
    pub provider: Arc<MockTokenProvider>,
    pub cache: Arc<MockTokenCache>,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MockExtractionStore>,
    pub service: Arc<ExtractionService>,
}

impl Harness {
    pub fn new(
        provider: MockTokenProvider,
        cache: MockTokenCache,
        transport: MockTransport,
        store: MockExtractionStore,
    ) -> Self {
        let provider = Arc::new(provider);
        let cache = Arc::new(cache);
        let transport = Arc::new(transport);
        let store = Arc::new(store);
        let service = Arc::new(ExtractionService::from_ports(
            provider.clone(),
            cache.clone(),
            transport.clone(),
            store.clone(),
        ));
        Self { provider, cache, transport, store, service }
    }

    /// Unauthenticated service over `transport`.
    pub fn with_transport(transport: MockTransport) -> Self {
        Self::new(
            MockTokenProvider::new(),
            MockTokenCache::new(),
            transport,
            MockExtractionStore::new(),
        )
    }
}
