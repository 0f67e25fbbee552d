//! Domain types and models

pub mod extraction;
pub mod request;
pub mod token;

pub use extraction::{empty_content, ApiResponse, Attempt, Extraction, ExtractionStatus};
pub use request::{Request, RequestBuilder, RequestMethod};
pub use token::AccessToken;
