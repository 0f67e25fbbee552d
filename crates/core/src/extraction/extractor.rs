//! One authenticated extraction

use std::sync::Arc;

use extraction_domain::{Extraction, Request, Result};

use super::executor::RequestExecutor;
use crate::auth::AuthOrchestrator;

/// Attaches credentials when the request names an identity, then executes it.
pub struct Extractor {
    auth: Arc<AuthOrchestrator>,
    executor: RequestExecutor,
}

impl Extractor {
    pub fn new(auth: Arc<AuthOrchestrator>, executor: RequestExecutor) -> Self {
        Self { auth, executor }
    }

    /// Execute `request`, authenticating first if it carries an identity.
    ///
    /// The returned [`Extraction`] holds the request that was actually sent,
    /// including its `Authorization` header. The input is never modified.
    ///
    /// # Errors
    ///
    /// Fails only when a token cannot be obtained; in that case no attempt
    /// has been made.
    pub async fn extract(&self, request: &Request) -> Result<Extraction> {
        let executed = match request.identity() {
            Some(identifier) => {
                let token = self.auth.get(identifier).await?;
                request.with_authorization(&token)
            }
            None => request.clone(),
        };

        let attempts = self.executor.execute(&executed).await;
        Ok(Extraction::new(executed, attempts))
    }
}
