//! Database implementations

pub mod extraction_repository;
pub mod manager;
pub(crate) mod support;
pub mod token_cache_repository;

pub use extraction_repository::*;
pub use manager::*;
pub use token_cache_repository::*;
