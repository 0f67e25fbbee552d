//! Lazy multi-page traversal

use std::sync::Arc;

use extraction_domain::{Extraction, Request};
use futures::stream::{self, Stream};
use tracing::debug;

use crate::continuation::{ContinuationBuilder, OffsetPaging, ScrollToken};
use crate::extraction::{ExtractionService, ServiceResult};

/// Pull-based sequence of extractions for one logical multi-page fetch.
///
/// The first call to [`next`](Self::next) runs the start request. Each later
/// call runs the request the continuation builder derived from the previous
/// extraction. The sequence ends once the builder reports no continuation or
/// after an error has been returned; from then on `next` yields `None`.
///
/// A generator cannot be rewound. To traverse again, build a new one from the
/// original start request. Dropping it part-way is safe: nothing runs in the
/// background.
pub struct PagedExtractionGenerator {
    service: Arc<ExtractionService>,
    builder: Arc<dyn ContinuationBuilder>,
    pending: Option<Request>,
    pages: usize,
}

impl PagedExtractionGenerator {
    pub fn new(
        service: Arc<ExtractionService>,
        builder: Arc<dyn ContinuationBuilder>,
        start: Request,
    ) -> Self {
        Self { service, builder, pending: Some(start), pages: 0 }
    }

    /// Offset/limit traversal reading the paging object at `key_path`.
    pub fn offset_paging(
        service: Arc<ExtractionService>,
        start: Request,
        key_path: impl Into<String>,
    ) -> Self {
        Self::new(service, Arc::new(OffsetPaging::new(key_path)), start)
    }

    /// Scroll traversal reading the token at `key_path`.
    pub fn scroll(service: Arc<ExtractionService>, start: Request, key_path: impl Into<String>) -> Self {
        Self::new(service, Arc::new(ScrollToken::new(key_path)), start)
    }

    /// Fetch the next page, or `None` when the traversal is over.
    pub async fn next(&mut self) -> Option<ServiceResult<Extraction>> {
        let request = self.pending.take()?;
        self.pages += 1;

        match self.service.extract(&request).await {
            Ok(extraction) => {
                self.pending = self.builder.build(&extraction);
                if self.pending.is_none() {
                    debug!(pages = self.pages, "traversal complete");
                }
                Some(Ok(extraction))
            }
            Err(err) => {
                debug!(pages = self.pages, error = %err, "traversal stopped on error");
                Some(Err(err))
            }
        }
    }

    /// Whether `next` will return `None`.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none()
    }

    /// Number of pages requested so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Adapt into a [`Stream`] with the same semantics as [`next`](Self::next).
    pub fn into_stream(self) -> impl Stream<Item = ServiceResult<Extraction>> + Send {
        stream::unfold(self, |mut generator| async move {
            let item = generator.next().await?;
            Some((item, generator))
        })
    }
}
