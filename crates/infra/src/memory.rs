//! Process-local port implementations
//!
//! Used when no database is configured and by tests that want real
//! storage semantics without SQLite.

use std::collections::HashMap;

use async_trait::async_trait;
use extraction_core::ports::{ExtractionStore, TokenCache};
use extraction_domain::{AccessToken, Extraction, Result};
use parking_lot::Mutex;

/// [`TokenCache`] backed by a map
#[derive(Default)]
pub struct InMemoryTokenCache {
    tokens: Mutex<HashMap<String, AccessToken>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.lock().is_empty()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, identifier: &str) -> Result<Option<AccessToken>> {
        Ok(self.tokens.lock().get(identifier).cloned())
    }

    async fn save(&self, identifier: &str, token: &AccessToken) -> Result<()> {
        self.tokens.lock().insert(identifier.to_string(), token.clone());
        Ok(())
    }
}

/// Append-only [`ExtractionStore`] kept in memory.
#[derive(Default)]
pub struct InMemoryExtractionStore {
    extractions: Mutex<Vec<Extraction>>,
}

impl InMemoryExtractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in insertion order.
    pub fn snapshot(&self) -> Vec<Extraction> {
        self.extractions.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.extractions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractions.lock().is_empty()
    }
}

#[async_trait]
impl ExtractionStore for InMemoryExtractionStore {
    async fn save(&self, extraction: &Extraction) -> Result<()> {
        self.extractions.lock().push(extraction.clone());
        Ok(())
    }
}
