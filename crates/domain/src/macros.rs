//! Macro for implementing Display and FromStr for status enums
//!
//! Status values are persisted as text by the storage adapters, so the
//! string form must round-trip. Parsing is case-insensitive.
//!
//! # Example
//!
//! ```rust
//! use extraction_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PageState {
//!     Pending,
//!     Fetched,
//! }
//!
//! impl_domain_status_conversions!(PageState {
//!     Pending => "pending",
//!     Fetched => "fetched",
//! });
//!
//! assert_eq!(PageState::Fetched.to_string(), "fetched");
//! assert_eq!("PENDING".parse::<PageState>(), Ok(PageState::Pending));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of variants to their lowercase string form
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
