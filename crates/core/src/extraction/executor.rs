//! Bounded retry with backoff

use std::sync::Arc;

use chrono::Utc;
use extraction_domain::{Attempt, Request};
use tracing::{debug, instrument, warn};

use crate::ports::RequestTransport;

/// Executes one [`Request`] up to `request.retries()` times.
pub struct RequestExecutor {
    transport: Arc<dyn RequestTransport>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn RequestTransport>) -> Self {
        Self { transport }
    }

    /// Run `request` until the first successful attempt or until the retry
    /// budget is spent.
    ///
    /// Always returns at least one attempt, in chronological order. Failure
    /// is represented in the attempts, never as an error: a transport error
    /// becomes an attempt with status code 0. When a backoff is configured
    /// the current task sleeps between failed attempts, but not after the
    /// last one.
    #[instrument(skip_all, fields(request_id = %request.id(), url = request.url()))]
    pub async fn execute(&self, request: &Request) -> Vec<Attempt> {
        let max_attempts = request.retries().max(1);
        let mut attempts = Vec::new();

        for number in 1..=max_attempts {
            let attempt = self.attempt_once(request).await;
            let succeeded = attempt.success();
            debug!(
                attempt = number,
                max_attempts,
                status = attempt.response.status_code,
                "attempt finished"
            );
            attempts.push(attempt);

            if succeeded {
                break;
            }
            if number < max_attempts {
                if let Some(backoff) = request.backoff() {
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        attempts
    }

    async fn attempt_once(&self, request: &Request) -> Attempt {
        match self.transport.send(request).await {
            Ok(response) => Attempt::new(Utc::now(), response),
            Err(err) => {
                warn!(error = %err, "transport failure");
                Attempt::transport_failure(Utc::now(), err.to_string())
            }
        }
    }
}
