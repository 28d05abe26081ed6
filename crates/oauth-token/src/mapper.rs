//! Response Mapper
//!
//! Parses token endpoint responses and writes their fields into a record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::common::{ProviderError, ProviderResult};
use crate::state::ResourceData;

/// Fields of an OAuth2 token response. Missing (or null) fields read as
/// empty strings; everything else in the body, `expires_in` included, is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub access_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scope: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub token_type: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TokenResponse {
    pub fn parse(body: &[u8]) -> ProviderResult<Self> {
        serde_json::from_slice(body).map_err(ProviderError::MalformedResponse)
    }

    /// Value of a response field by attribute name
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "access_token" => Some(&self.access_token),
            "id_token" => Some(&self.id_token),
            "scope" => Some(&self.scope),
            "token_type" => Some(&self.token_type),
            _ => None,
        }
    }
}

/// Write `fields` of `token` into `data` and assign the record id.
///
/// Writes are all or nothing, and the id is only set once they succeed.
pub fn apply_token(
    data: &mut ResourceData,
    token: &TokenResponse,
    fields: &[&str],
    identity: String,
) -> ProviderResult<()> {
    let mut writes = Vec::with_capacity(fields.len());
    for &name in fields {
        let value = token
            .field(name)
            .ok_or_else(|| ProviderError::field_assignment(name, "not part of a token response"))?;
        writes.push((name, Value::from(value)));
    }

    data.set_all(writes)?;
    data.set_id(identity);
    Ok(())
}

/// Parse a raw response body and apply it.
pub fn map_response(
    data: &mut ResourceData,
    body: &[u8],
    fields: &[&str],
    identity: String,
) -> ProviderResult<()> {
    let token = TokenResponse::parse(body)?;
    apply_token(data, &token, fields, identity)
}
