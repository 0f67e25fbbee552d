//! Cache-hit / refresh / full-reauth decision for one identifier

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use extraction_domain::{AccessToken, ExtractionError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::ports::{TokenCache, TokenProvider};

/// Obtains a valid [`AccessToken`] for an identifier.
///
/// Resolution order:
/// 1. an unexpired cached token is returned as-is, with no provider call and
///    no cache write;
/// 2. an expired token carrying a refresh credential is refreshed; a failed
///    refresh is logged and ignored;
/// 3. otherwise a full authentication is performed.
///
/// Whatever steps 2 or 3 produce is saved to the cache exactly once before
/// it is returned.
///
/// Calls for the same identifier are serialized. A caller that waited on the
/// lock re-reads the cache, so it picks up the token the previous holder just
/// saved instead of authenticating again. Different identifiers never contend.
/// A per-identifier lock lives only while some call for that identifier is
/// in flight.
pub struct AuthOrchestrator {
    provider: Arc<dyn TokenProvider>,
    cache: Arc<dyn TokenCache>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AuthOrchestrator {
    pub fn new(provider: Arc<dyn TokenProvider>, cache: Arc<dyn TokenCache>) -> Self {
        Self { provider, cache, locks: DashMap::new() }
    }

    /// Return a valid token for `identifier`.
    ///
    /// # Errors
    ///
    /// `ExtractionError::Auth` when neither refresh nor full authentication
    /// yields a token. Cache errors are returned unchanged.
    #[instrument(skip(self))]
    pub async fn get(&self, identifier: &str) -> Result<AccessToken> {
        let lock = self.lock_for(identifier);
        let result = {
            let _guard = lock.lock().await;
            self.resolve(identifier).await
        };
        drop(lock);
        self.locks.remove_if(identifier, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn resolve(&self, identifier: &str) -> Result<AccessToken> {
        let cached = self.cache.get(identifier).await?;

        if let Some(token) = &cached {
            if !token.is_expired_at(Utc::now()) {
                debug!("using cached token");
                return Ok(token.clone());
            }
        }

        let refreshed = match &cached {
            Some(token) if token.has_refresh_token() => self.try_refresh(identifier, token).await,
            _ => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None => {
                info!("performing full authentication");
                self.provider.auth(identifier).await.map_err(into_auth_error)?
            }
        };

        self.cache.save(identifier, &token).await?;
        Ok(token)
    }

    async fn try_refresh(&self, identifier: &str, expired: &AccessToken) -> Option<AccessToken> {
        match self.provider.refresh(identifier, expired.refresh_token()).await {
            Ok(token) => {
                debug!("refreshed expired token");
                Some(token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, falling back to full authentication");
                None
            }
        }
    }

    fn lock_for(&self, identifier: &str) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(identifier.to_owned()).or_default())
    }
}

fn into_auth_error(err: ExtractionError) -> ExtractionError {
    match err {
        ExtractionError::Auth(_) => err,
        other => ExtractionError::Auth(other.to_string()),
    }
}
