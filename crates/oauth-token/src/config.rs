//! Data source configuration
//!
//! Typed configuration for each data source, decoded from the host's JSON
//! object. Unset string arguments decode to empty strings; other defaults
//! come from the functions in [`defaults`], which the schemas reuse.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::common::{ProviderError, ProviderResult};
use crate::credentials::CredentialSet;
use crate::schema::DataSourceSchema;

pub mod defaults {
    /// Google's OAuth2 token endpoint
    pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

    pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

    pub fn token_url() -> String {
        GOOGLE_TOKEN_URL.to_string()
    }

    pub fn scopes() -> Vec<String> {
        vec![CLOUD_PLATFORM_SCOPE.to_string()]
    }
}

/// Arguments of `oauth_refresh_access_token`
#[derive(Clone, Deserialize)]
pub struct RefreshAccessTokenConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "defaults::token_url")]
    pub token_url: String,
}

impl RefreshAccessTokenConfig {
    /// The configured credentials, possibly with empty fields
    pub fn explicit_credentials(&self) -> CredentialSet {
        CredentialSet::new(
            self.client_id.as_str(),
            self.client_secret.as_str(),
            self.refresh_token.as_str(),
        )
    }
}

impl Default for RefreshAccessTokenConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            token_url: defaults::token_url(),
        }
    }
}

impl fmt::Debug for RefreshAccessTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshAccessTokenConfig")
            .field("client_id", &"[REDACTED]")
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Arguments of `oauth_google_access_token`
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleAccessTokenConfig {
    #[serde(default = "defaults::scopes")]
    pub scopes: Vec<String>,
}

impl Default for GoogleAccessTokenConfig {
    fn default() -> Self {
        Self {
            scopes: defaults::scopes(),
        }
    }
}

/// Validate a host configuration against `schema` and decode it.
///
/// `null` arguments count as unset, so they pick up their defaults.
pub fn decode_config<T: DeserializeOwned>(schema: &DataSourceSchema, config: Value) -> ProviderResult<T> {
    let mut object = match config {
        Value::Null => serde_json::Map::new(),
        Value::Object(object) => object,
        other => {
            return Err(ProviderError::InvalidConfig(format!(
                "expected an object for {}, got {}",
                schema.type_name, other
            )))
        }
    };

    schema.validate_config(&object)?;
    object.retain(|_, value| !value.is_null());

    serde_json::from_value(Value::Object(object))
        .map_err(|e| ProviderError::InvalidConfig(format!("{}: {}", schema.type_name, e)))
}
