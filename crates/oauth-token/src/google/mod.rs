//! Google Application Default Credentials token sources
//!
//! Picks a token source from the discovered ADC document: user credentials
//! use the refresh-token grant, service accounts the JWT-bearer grant, and
//! without any document the GCE metadata server is asked.

pub mod metadata;
pub mod service_account;

use reqwest::Client;
use tracing::debug;

use crate::common::{ProviderError, ProviderResult};
use crate::config::defaults;
use crate::credentials::{AdcDocument, CredentialSet, DefaultCredentialsSource};
use crate::exchange::{self, TokenRequest};
use crate::mapper::TokenResponse;

pub use metadata::MetadataServer;
pub use service_account::ServiceAccountKey;

const AUTHORIZED_USER: &str = "authorized_user";
const SERVICE_ACCOUNT: &str = "service_account";

/// Where an access token for the Google data source comes from
#[derive(Debug)]
pub enum TokenSource {
    AuthorizedUser {
        request: TokenRequest,
        identity: String,
    },
    ServiceAccount {
        key: ServiceAccountKey,
        identity: String,
    },
    Metadata(MetadataServer),
}

impl TokenSource {
    /// Choose the token source from the default credentials.
    ///
    /// A missing credentials file, or no home directory to look in, falls
    /// back to the metadata server.
    pub fn discover(
        source: &dyn DefaultCredentialsSource,
        metadata: &MetadataServer,
    ) -> ProviderResult<Self> {
        let document = match source.load() {
            Ok(Some(document)) => document,
            Ok(None) | Err(ProviderError::HomeDirectoryUnresolvable) => {
                debug!("No ADC file, falling back to the metadata server");
                return Ok(Self::Metadata(metadata.clone()));
            }
            Err(e) => return Err(e),
        };

        Self::from_document(&document)
    }

    pub fn from_document(document: &AdcDocument) -> ProviderResult<Self> {
        let identity = document.identity();
        match document.credential_type() {
            Some(AUTHORIZED_USER) => {
                let credentials = CredentialSet::from_document(document)?;
                let token_url = match document.string_field("token_uri")? {
                    uri if uri.is_empty() => defaults::token_url(),
                    uri => uri,
                };
                Ok(Self::AuthorizedUser {
                    request: TokenRequest::new(token_url, credentials),
                    identity,
                })
            }
            Some(SERVICE_ACCOUNT) => Ok(Self::ServiceAccount {
                key: ServiceAccountKey::from_document(document)?,
                identity,
            }),
            other => Err(ProviderError::CredentialsUnavailable(format!(
                "unsupported credential type {:?} in {}",
                other.unwrap_or("<missing>"),
                document.path().display()
            ))),
        }
    }

    /// Record id: digest of the credentials document, or of the metadata
    /// token URL when there is none.
    pub fn identity(&self) -> String {
        match self {
            Self::AuthorizedUser { identity, .. } | Self::ServiceAccount { identity, .. } => {
                identity.clone()
            }
            Self::Metadata(server) => server.identity(),
        }
    }

    /// Fetch an access token. User credentials ignore `scopes`; their scopes
    /// were fixed when the refresh token was issued.
    pub async fn token(&self, client: &Client, scopes: &[String]) -> ProviderResult<TokenResponse> {
        match self {
            Self::AuthorizedUser { request, .. } => {
                let raw = exchange::exchange(client, request).await?;
                TokenResponse::parse(&raw.body)
            }
            Self::ServiceAccount { key, .. } => key.token(client, scopes).await,
            Self::Metadata(server) => server.token(client, scopes).await,
        }
    }
}
