//! Common Result Type

use super::error::ProviderError;

/// Result of any provider operation.
pub type ProviderResult<T> = Result<T, ProviderError>;
