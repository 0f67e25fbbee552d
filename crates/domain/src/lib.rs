//! # Extraction Domain
//!
//! Value types shared by every layer of the extraction pipeline.
//!
//! This crate contains:
//! - Credentials (`AccessToken`)
//! - The unit of work and its recorded outcome (`Request`, `Attempt`,
//!   `Extraction`, `ApiResponse`)
//! - Error types and the `Result` alias
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure data and derivations, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
