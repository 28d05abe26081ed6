//! Common Utilities
//!
//! Shared error handling, HTTP client construction and path resolution.

pub mod error;
pub mod http;
pub mod paths;
pub mod result;

pub use error::{ErrorCode, ProviderError};
pub use http::create_http_client;
pub use paths::{well_known_adc_path, CREDENTIALS_ENV};
pub use result::ProviderResult;
