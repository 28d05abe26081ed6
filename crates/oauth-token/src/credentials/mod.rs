//! Credential Resolver
//!
//! Produces the client id, client secret and refresh token for a refresh
//! grant, from explicit configuration or from Application Default Credentials.

pub mod adc;

use std::fmt;

use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::common::{ProviderError, ProviderResult};

pub use adc::{AdcDiscovery, AdcDocument, AdcPath, DefaultCredentialsSource};

/// Client credentials plus refresh token. Wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

// Custom Debug implementation that redacts sensitive fields
impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("client_id", &"[REDACTED]")
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

impl CredentialSet {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Read the three fields from an ADC document.
    ///
    /// Only `authorized_user` documents carry them; anything without a
    /// `client_id` is rejected.
    pub fn from_document(document: &AdcDocument) -> ProviderResult<Self> {
        let credentials = Self {
            client_id: document.string_field("client_id")?,
            client_secret: document.string_field("client_secret")?,
            refresh_token: document.string_field("refresh_token")?,
        };

        if credentials.client_id.is_empty() {
            return Err(ProviderError::CredentialsUnavailable(format!(
                "{} has no client_id (credential type {})",
                document.path().display(),
                document.credential_type().unwrap_or("unknown")
            )));
        }

        Ok(credentials)
    }

    fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Resolve the credentials for one read.
///
/// With an explicit `client_id`, explicit values are used verbatim and empty
/// secret or refresh token fields are filled from the default credentials
/// when those can be found. Without one, all three come from the default
/// credentials, except explicit non-empty secret or refresh token values.
pub fn resolve(
    explicit: CredentialSet,
    source: &dyn DefaultCredentialsSource,
) -> ProviderResult<CredentialSet> {
    if explicit.client_id.is_empty() {
        let discovered = load_default_credentials(source)?;
        return Ok(merge(&explicit, &discovered));
    }

    if explicit.is_complete() {
        return Ok(explicit);
    }

    match load_default_credentials(source) {
        Ok(discovered) => Ok(merge(&explicit, &discovered)),
        Err(e) => {
            debug!("Keeping explicit credentials, defaults unavailable: {}", e);
            Ok(explicit)
        }
    }
}

fn load_default_credentials(source: &dyn DefaultCredentialsSource) -> ProviderResult<CredentialSet> {
    let document = source.load()?.ok_or_else(|| {
        ProviderError::CredentialsUnavailable(
            "could not find Application Default Credentials; run `gcloud auth application-default login`"
                .to_string(),
        )
    })?;
    CredentialSet::from_document(&document)
}

/// Explicit non-empty values win over discovered ones.
fn merge(explicit: &CredentialSet, discovered: &CredentialSet) -> CredentialSet {
    let pick = |explicit: &String, discovered: &String| {
        if explicit.is_empty() {
            discovered.clone()
        } else {
            explicit.clone()
        }
    };

    CredentialSet {
        client_id: pick(&explicit.client_id, &discovered.client_id),
        client_secret: pick(&explicit.client_secret, &discovered.client_secret),
        refresh_token: pick(&explicit.refresh_token, &discovered.refresh_token),
    }
}
