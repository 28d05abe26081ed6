//! GCE metadata server token source.

use reqwest::Client;
use tracing::{debug, info};

use crate::common::{ProviderError, ProviderResult};
use crate::exchange;
use crate::identity::build_hash;
use crate::mapper::TokenResponse;

/// Environment variable overriding the metadata server host
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// The metadata server of the instance the provider runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataServer {
    base_url: String,
}

impl MetadataServer {
    pub fn from_env() -> Self {
        let host = std::env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());
        Self::with_base_url(format!("http://{}", host))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }

    /// Record id for tokens issued by this server
    pub fn identity(&self) -> String {
        build_hash([self.token_url()])
    }

    /// Fetch an access token for the instance's default service account.
    ///
    /// An unreachable server means there are no default credentials at all.
    pub async fn token(&self, client: &Client, scopes: &[String]) -> ProviderResult<TokenResponse> {
        info!("Requesting access token from the metadata server");

        let mut request = client.get(self.token_url()).header("Metadata-Flavor", "Google");
        if !scopes.is_empty() {
            request = request.query(&[("scopes", scopes.join(","))]);
        }

        let response = request.send().await.map_err(|e| {
            debug!("Metadata server unreachable: {}", e);
            ProviderError::CredentialsUnavailable(format!(
                "no credentials file found and the metadata server at {} is unreachable",
                self.base_url
            ))
        })?;

        let raw = exchange::read_checked(response).await?;
        TokenResponse::parse(&raw.body)
    }
}
