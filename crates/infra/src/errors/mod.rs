//! Infrastructure error handling

mod conversions;

pub(crate) use conversions::to_domain;
pub use conversions::InfraError;
