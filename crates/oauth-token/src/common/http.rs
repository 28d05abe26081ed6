//! HTTP Client Utilities
//!
//! Shared HTTP client creation for token endpoints and the metadata server.

use super::result::ProviderResult;

/// Create the reqwest client used by every data source.
///
/// No request timeout is set; cancellation belongs to the host.
pub fn create_http_client() -> ProviderResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("terraform-provider-oauth/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
