//! Dependency wiring
//!
//! Builds the concrete adapters for a [`Config`] and hands out the
//! [`ExtractionService`] and generators built on top of it.

use std::sync::Arc;

use extraction_core::ports::{ExtractionStore, RequestTransport, TokenCache, TokenProvider};
use extraction_core::{ExtractionService, PagedExtractionGenerator};
use extraction_domain::constants::{DEFAULT_PAGING_KEY_PATH, DEFAULT_SCROLL_KEY_PATH};
use extraction_domain::{Config, Request, Result};
use tracing::info;

use crate::auth::PasswordGrantTokenProvider;
use crate::database::{DbManager, SqliteExtractionStore, SqliteTokenCache};
use crate::http::HttpClient;
use crate::memory::{InMemoryExtractionStore, InMemoryTokenCache};

/// Fully wired pipeline.
pub struct Container {
    pub config: Config,
    /// `None` for in-memory containers.
    pub db: Option<Arc<DbManager>>,
    pub transport: Arc<dyn RequestTransport>,
    pub token_cache: Arc<dyn TokenCache>,
    pub store: Arc<dyn ExtractionStore>,
    /// Query side of the SQLite store, when one is in use.
    pub history: Option<Arc<SqliteExtractionStore>>,
    pub service: Arc<ExtractionService>,
}

impl Container {
    /// SQLite-backed pipeline: opens (and migrates) the configured database.
    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        let transport: Arc<dyn RequestTransport> = Arc::new(HttpClient::from_config(&config.http)?);
        let token_cache: Arc<dyn TokenCache> = Arc::new(SqliteTokenCache::new(Arc::clone(&db)));
        let history = Arc::new(SqliteExtractionStore::new(Arc::clone(&db)));
        let store: Arc<dyn ExtractionStore> = history.clone();

        info!(db_path = %db.path().display(), accounts = config.auth.accounts.len(), "pipeline wired");

        Ok(Self::assemble(config, Some(db), transport, token_cache, store, Some(history)))
    }

    /// Pipeline that keeps tokens and extractions in process memory.
    pub fn in_memory(config: &Config) -> Result<Self> {
        let transport: Arc<dyn RequestTransport> = Arc::new(HttpClient::from_config(&config.http)?);
        Ok(Self::with_transport(config, transport))
    }

    /// In-memory pipeline over a caller-supplied transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn RequestTransport>) -> Self {
        let token_cache: Arc<dyn TokenCache> = Arc::new(InMemoryTokenCache::new());
        let store: Arc<dyn ExtractionStore> = Arc::new(InMemoryExtractionStore::new());
        Self::assemble(config, None, transport, token_cache, store, None)
    }

    fn assemble(
        config: &Config,
        db: Option<Arc<DbManager>>,
        transport: Arc<dyn RequestTransport>,
        token_cache: Arc<dyn TokenCache>,
        store: Arc<dyn ExtractionStore>,
        history: Option<Arc<SqliteExtractionStore>>,
    ) -> Self {
        let provider: Arc<dyn TokenProvider> =
            Arc::new(PasswordGrantTokenProvider::new(Arc::clone(&transport), config.auth.clone()));
        let service = Arc::new(ExtractionService::from_ports(
            provider,
            Arc::clone(&token_cache),
            Arc::clone(&transport),
            Arc::clone(&store),
        ));

        Self { config: config.clone(), db, transport, token_cache, store, history, service }
    }

    /// Offset-paged generator reading continuation from `paging`.
    pub fn offset_pages(&self, start: Request) -> PagedExtractionGenerator {
        PagedExtractionGenerator::offset_paging(
            Arc::clone(&self.service),
            start,
            DEFAULT_PAGING_KEY_PATH,
        )
    }

    /// Scroll-token generator reading continuation from `scroll_id`.
    pub fn scroll_pages(&self, start: Request) -> PagedExtractionGenerator {
        PagedExtractionGenerator::scroll(Arc::clone(&self.service), start, DEFAULT_SCROLL_KEY_PATH)
    }

    /// Verify the database (if any) is reachable.
    pub fn health_check(&self) -> Result<()> {
        match &self.db {
            Some(db) => db.health_check(),
            None => Ok(()),
        }
    }
}
