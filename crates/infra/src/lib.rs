//! # Extraction Infrastructure
//!
//! Infrastructure implementations of the core pipeline ports.
//!
//! This crate contains:
//! - HTTP transport (reqwest)
//! - Password-grant token provider
//! - SQLite token cache and extraction store (rusqlite + r2d2)
//! - In-memory adapters
//! - Configuration loading and logging bootstrap
//! - The wiring container
//!
//! ## Architecture
//! - Implements traits defined in `extraction-core`
//! - Depends on `extraction-domain` and `extraction-core`
//! - Contains all "impure" code (network, disk, environment)

pub mod auth;
pub mod config;
pub mod container;
pub mod database;
pub mod errors;
pub mod http;
pub mod memory;
pub mod observability;

// Re-export commonly used items
pub use auth::PasswordGrantTokenProvider;
pub use container::Container;
pub use database::{DbManager, SqliteExtractionStore, SqliteTokenCache};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use memory::{InMemoryExtractionStore, InMemoryTokenCache};
pub use observability::init_tracing;
