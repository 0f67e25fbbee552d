//! Executing requests and recording their outcome

pub mod executor;
pub mod extractor;
pub mod service;

pub use executor::RequestExecutor;
pub use extractor::Extractor;
pub use service::{ExtractionService, ServiceError, ServiceResult};
