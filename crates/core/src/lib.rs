//! # Extraction Core
//!
//! Orchestration logic of the extraction pipeline - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for token providers, token caches, the HTTP
//!   transport and the extraction store
//! - Credential orchestration (`AuthOrchestrator`)
//! - Retrying execution and persistence (`RequestExecutor`, `Extractor`,
//!   `ExtractionService`)
//! - Continuation builders and the paged generator
//!
//! ## Architecture Principles
//! - Only depends on `extraction-domain`
//! - No database or HTTP code
//! - All external dependencies via traits

pub mod auth;
pub mod continuation;
pub mod extraction;
pub mod pagination;
pub mod ports;

pub use auth::AuthOrchestrator;
pub use continuation::{ContinuationBuilder, OffsetPaging, ScrollToken};
pub use extraction::{
    ExtractionService, Extractor, RequestExecutor, ServiceError, ServiceResult,
};
pub use pagination::PagedExtractionGenerator;
pub use ports::{ExtractionStore, RequestTransport, TokenCache, TokenProvider};
