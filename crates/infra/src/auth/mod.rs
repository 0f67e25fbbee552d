//! Identity endpoint adapters

pub mod token_provider;

pub use token_provider::PasswordGrantTokenProvider;
