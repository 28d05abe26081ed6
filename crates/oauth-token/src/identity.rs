//! Record Identity
//!
//! Data source records are identified by a SHA-256 digest of the material
//! that produced them, so identical inputs always read back under the same id.
//! The digest is an opaque identifier, not a credential.

use sha2::{Digest, Sha256};

use crate::credentials::CredentialSet;

/// Hex-encoded SHA-256 over the plain concatenation of `tokens`.
pub fn build_hash<I, T>(tokens: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for token in tokens {
        hasher.update(token.as_ref());
    }
    hex::encode(hasher.finalize())
}

/// Identity of a refresh-token read: client id, client secret, refresh token
/// and token URL, in that order.
pub fn resource_identity(credentials: &CredentialSet, token_url: &str) -> String {
    build_hash([
        credentials.client_id.as_str(),
        credentials.client_secret.as_str(),
        credentials.refresh_token.as_str(),
        token_url,
    ])
}
