//! Common Error Types
//!
//! One error type for every stage of a data source read, with JSON-RPC error
//! code mapping for the stdio host.

use reqwest::StatusCode;
use thiserror::Error;

/// JSON-RPC error codes
///
/// Standard codes: -32768 to -32000
/// Custom codes: -32099 to -32000
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Standard JSON-RPC errors
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,

    // Token retrieval
    CredentialsUnavailable = -32010,
    UpstreamError = -32011,
    NetworkError = -32012,
    MalformedResponse = -32013,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Failure of a data source read.
///
/// Every variant aborts the read; nothing is retried.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// ADC document missing, unreadable, or not shaped like credentials.
    #[error("default credentials unavailable: {0}")]
    CredentialsUnavailable(String),

    #[error("could not determine home directory")]
    HomeDirectoryUnresolvable,

    /// Transport-level failure talking to the token endpoint.
    #[error("token request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("responded with code {status}: {status_text}")]
    Upstream { status: u16, status_text: String },

    #[error("invalid JSON in token response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("cannot set attribute '{field}': {reason}")]
    FieldAssignment { field: String, reason: String },

    #[error("unsupported data source: {0}")]
    UnknownDataSource(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to sign service account assertion: {0}")]
    SigningFailed(String),
}

impl ProviderError {
    /// Build an upstream error from a non-2xx status
    pub fn upstream(status: StatusCode) -> Self {
        Self::Upstream {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    pub fn field_assignment(field: &str, reason: impl Into<String>) -> Self {
        Self::FieldAssignment {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// JSON-RPC code reported by the stdio host
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CredentialsUnavailable(_) | Self::HomeDirectoryUnresolvable => {
                ErrorCode::CredentialsUnavailable
            }
            Self::Network(_) => ErrorCode::NetworkError,
            Self::Upstream { .. } => ErrorCode::UpstreamError,
            Self::MalformedResponse(_) => ErrorCode::MalformedResponse,
            Self::UnknownDataSource(_) => ErrorCode::MethodNotFound,
            Self::InvalidConfig(_) => ErrorCode::InvalidParams,
            Self::FieldAssignment { .. } | Self::SigningFailed(_) => ErrorCode::InternalError,
        }
    }

    /// Convert to (code, message) tuple for protocol responses
    pub fn to_tuple(&self) -> (i32, String) {
        (self.code().code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_uses_canonical_reason() {
        let err = ProviderError::upstream(StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "responded with code 401: Unauthorized");
        assert_eq!(err.code(), ErrorCode::UpstreamError);
    }

    #[test]
    fn test_credential_errors_share_code() {
        let missing = ProviderError::CredentialsUnavailable("no file".into());
        assert_eq!(missing.code(), ProviderError::HomeDirectoryUnresolvable.code());
        assert_eq!(missing.to_tuple().0, -32010);
    }
}
