//! Extraction service: authenticate, execute, persist, return

use std::sync::Arc;

use extraction_domain::{Extraction, ExtractionError, Request};
use thiserror::Error;
use tracing::{error, info, instrument};

use super::executor::RequestExecutor;
use super::extractor::Extractor;
use crate::auth::AuthOrchestrator;
use crate::ports::{ExtractionStore, RequestTransport, TokenCache, TokenProvider};

/// Failure of [`ExtractionService::extract`]
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No token could be obtained (or the token cache failed). Nothing was
    /// sent and nothing was recorded.
    #[error(transparent)]
    Auth(ExtractionError),

    /// The extraction ran but could not be recorded. The extraction is
    /// returned unchanged.
    #[error("extraction could not be recorded: {source}")]
    Persistence {
        #[source]
        source: ExtractionError,
        extraction: Box<Extraction>,
    },
}

impl ServiceError {
    /// The extraction that was performed, if any
    pub fn extraction(&self) -> Option<&Extraction> {
        match self {
            Self::Auth(_) => None,
            Self::Persistence { extraction, .. } => Some(extraction),
        }
    }

    pub fn into_extraction(self) -> Option<Extraction> {
        match self {
            Self::Auth(_) => None,
            Self::Persistence { extraction, .. } => Some(*extraction),
        }
    }

    /// Underlying domain error
    pub fn cause(&self) -> &ExtractionError {
        match self {
            Self::Auth(source) | Self::Persistence { source, .. } => source,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Top-level façade over [`Extractor`] and [`ExtractionStore`].
pub struct ExtractionService {
    extractor: Extractor,
    store: Arc<dyn ExtractionStore>,
}

impl ExtractionService {
    pub fn new(extractor: Extractor, store: Arc<dyn ExtractionStore>) -> Self {
        Self { extractor, store }
    }

    /// Wire a service directly from its ports.
    pub fn from_ports(
        provider: Arc<dyn TokenProvider>,
        cache: Arc<dyn TokenCache>,
        transport: Arc<dyn RequestTransport>,
        store: Arc<dyn ExtractionStore>,
    ) -> Self {
        let auth = Arc::new(AuthOrchestrator::new(provider, cache));
        let extractor = Extractor::new(auth, RequestExecutor::new(transport));
        Self::new(extractor, store)
    }

    /// Run `request` and record the result.
    ///
    /// The store is called exactly once for every extraction that was
    /// performed, whatever its status.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Auth`] when credentials could not be obtained,
    /// [`ServiceError::Persistence`] when the store rejected the extraction.
    #[instrument(
        skip_all,
        fields(request_id = %request.id(), url = request.url(), identity = request.identity())
    )]
    pub async fn extract(&self, request: &Request) -> ServiceResult<Extraction> {
        let extraction = self.extractor.extract(request).await.map_err(ServiceError::Auth)?;

        info!(
            status = %extraction.status(),
            attempts = extraction.retries(),
            "extraction finished"
        );

        if let Err(source) = self.store.save(&extraction).await {
            error!(error = %source, "failed to persist extraction");
            return Err(ServiceError::Persistence { source, extraction: Box::new(extraction) });
        }

        Ok(extraction)
    }
}
