//! Token Exchanger
//!
//! Single-attempt form POSTs to OAuth2 token endpoints. Bodies are read in
//! full and written to the debug log before the status is checked.

use reqwest::{Client, Response, StatusCode};
use tracing::{info, warn};

use crate::common::{ProviderError, ProviderResult};
use crate::credentials::CredentialSet;
use crate::debug_log;
use crate::identity;

/// `grant_type` of the refresh-token grant
pub const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// A refresh-token grant against one token endpoint
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub token_url: String,
    pub credentials: CredentialSet,
}

impl TokenRequest {
    pub fn new(token_url: impl Into<String>, credentials: CredentialSet) -> Self {
        Self {
            token_url: token_url.into(),
            credentials,
        }
    }

    pub fn grant_type(&self) -> &'static str {
        REFRESH_TOKEN_GRANT
    }

    fn form(&self) -> [(&str, &str); 4] {
        [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", self.grant_type()),
        ]
    }

    /// Record id for reads backed by this request
    pub fn identity(&self) -> String {
        identity::resource_identity(&self.credentials, &self.token_url)
    }
}

/// Body of a successful (2xx) token endpoint response
#[derive(Debug, Clone)]
pub struct RawTokenResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Perform the refresh-token grant.
pub async fn exchange(client: &Client, request: &TokenRequest) -> ProviderResult<RawTokenResponse> {
    info!(token_url = %request.token_url, "Refreshing access token");
    post_form(client, &request.token_url, &request.form()).await
}

/// POST a form-encoded request and return the response body.
///
/// Secrets travel in the request body, never in the URL.
pub async fn post_form(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
) -> ProviderResult<RawTokenResponse> {
    let response = client.post(url).form(params).send().await?;
    read_checked(response).await
}

/// Read the whole body, log it, then reject statuses outside 200-299.
pub async fn read_checked(response: Response) -> ProviderResult<RawTokenResponse> {
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    debug_log::log_response(&body);

    if !status.is_success() {
        warn!("Token endpoint responded with HTTP {}", status);
        return Err(ProviderError::upstream(status));
    }

    Ok(RawTokenResponse { status, body })
}
