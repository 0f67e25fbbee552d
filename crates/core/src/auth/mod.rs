//! Credential acquisition

pub mod orchestrator;

pub use orchestrator::AuthOrchestrator;
