//! `oauth_refresh_access_token`
//!
//! Exchanges a refresh token for an access token at a configurable token
//! endpoint. Credentials not given explicitly are taken from gcloud's
//! Application Default Credentials.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::DataSource;
use crate::common::ProviderResult;
use crate::config::{decode_config, defaults, RefreshAccessTokenConfig};
use crate::credentials::{self, DefaultCredentialsSource};
use crate::exchange::{self, TokenRequest};
use crate::mapper;
use crate::schema::{Attribute, AttributeType, DataSourceSchema};
use crate::state::ResourceData;

pub const TYPE_NAME: &str = "oauth_refresh_access_token";

/// Attributes written from the token response
pub const OUTPUT_FIELDS: &[&str] = &["access_token", "id_token", "scope", "token_type"];

pub fn schema() -> DataSourceSchema {
    DataSourceSchema::new(
        TYPE_NAME,
        "Access token from an OAuth2 refresh-token grant",
        vec![
            Attribute::argument("client_id", AttributeType::String)
                .sensitive()
                .describe("Client ID"),
            Attribute::argument("client_secret", AttributeType::String)
                .sensitive()
                .describe("Client Secret"),
            Attribute::argument("refresh_token", AttributeType::String)
                .sensitive()
                .describe("Refresh Token"),
            Attribute::argument("token_url", AttributeType::String)
                .describe("Token endpoint")
                .with_default(defaults::token_url()),
            Attribute::computed("access_token").sensitive(),
            Attribute::computed("id_token").sensitive(),
            Attribute::computed("scope"),
            Attribute::computed("token_type"),
        ],
    )
}

pub struct RefreshAccessToken {
    client: Client,
    credentials: Arc<dyn DefaultCredentialsSource>,
}

impl RefreshAccessToken {
    pub fn new(client: Client, credentials: Arc<dyn DefaultCredentialsSource>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Resolve credentials, exchange them, map the response.
    pub async fn read_config(&self, config: &RefreshAccessTokenConfig) -> ProviderResult<ResourceData> {
        let credentials =
            credentials::resolve(config.explicit_credentials(), self.credentials.as_ref())?;
        let request = TokenRequest::new(config.token_url.as_str(), credentials);

        let response = exchange::exchange(&self.client, &request).await?;

        let mut data = ResourceData::new(schema());
        mapper::map_response(&mut data, &response.body, OUTPUT_FIELDS, request.identity())?;
        Ok(data)
    }
}

#[async_trait]
impl DataSource for RefreshAccessToken {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> DataSourceSchema {
        schema()
    }

    async fn read(&self, config: Value) -> ProviderResult<ResourceData> {
        let config: RefreshAccessTokenConfig = decode_config(&schema(), config)?;
        self.read_config(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ProviderError;
    use crate::credentials::{AdcDiscovery, CredentialSet};
    use crate::identity::resource_identity;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GOOGLE_BODY: &str = r#"{
        "access_token": "1/fFAGRNJru1FTz70BzhT3Zg",
        "expires_in": 3920,
        "scope": "https://www.googleapis.com/auth/drive.metadata.readonly",
        "token_type": "Bearer"
    }"#;

    fn data_source(discovery: AdcDiscovery) -> RefreshAccessToken {
        RefreshAccessToken::new(Client::new(), Arc::new(discovery))
    }

    fn no_defaults() -> RefreshAccessToken {
        data_source(AdcDiscovery::with_paths(None, None))
    }

    async fn token_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn explicit_config(server: &MockServer) -> Value {
        json!({
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "rt",
            "token_url": format!("{}/token", server.uri()),
        })
    }

    #[tokio::test]
    async fn test_read_maps_google_response() {
        let server = token_server(200, GOOGLE_BODY).await;
        let token_url = format!("{}/token", server.uri());

        let data = no_defaults().read(explicit_config(&server)).await.unwrap();

        assert_eq!(data.get_str("access_token"), Some("1/fFAGRNJru1FTz70BzhT3Zg"));
        assert_eq!(data.get_str("id_token"), Some(""));
        assert_eq!(
            data.get_str("scope"),
            Some("https://www.googleapis.com/auth/drive.metadata.readonly")
        );
        assert_eq!(data.get_str("token_type"), Some("Bearer"));

        let expected = resource_identity(&CredentialSet::new("id", "secret", "rt"), &token_url);
        assert_eq!(data.id(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_reread_keeps_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GOOGLE_BODY))
            .expect(2)
            .mount(&server)
            .await;

        let ds = no_defaults();
        let first = ds.read(explicit_config(&server)).await.unwrap();
        let second = ds.read(explicit_config(&server)).await.unwrap();
        assert_eq!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_unauthorized_sets_nothing() {
        let server = token_server(401, r#"{"error":"invalid_grant"}"#).await;
        let err = no_defaults().read(explicit_config(&server)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = token_server(200, "<html>oops</html>").await;
        let err = no_defaults().read(explicit_config(&server)).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_credentials_from_adc_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("client_id=adc-id"))
            .and(body_string_contains("client_secret=adc-secret"))
            .and(body_string_contains("refresh_token=adc-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GOOGLE_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let adc = dir.path().join("application_default_credentials.json");
        std::fs::write(
            &adc,
            r#"{"client_id":"adc-id","client_secret":"adc-secret","refresh_token":"adc-refresh","type":"authorized_user"}"#,
        )
        .unwrap();

        let ds = data_source(AdcDiscovery::with_paths(None, Some(adc)));
        let data = ds
            .read(json!({"token_url": format!("{}/token", server.uri())}))
            .await
            .unwrap();
        assert_eq!(data.get_str("token_type"), Some("Bearer"));
    }

    #[tokio::test]
    async fn test_missing_defaults_fail_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GOOGLE_BODY))
            .expect(0)
            .mount(&server)
            .await;

        let err = no_defaults()
            .read(json!({"token_url": format!("{}/token", server.uri())}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::HomeDirectoryUnresolvable));
    }

    #[tokio::test]
    async fn test_unknown_argument_rejected() {
        let err = no_defaults().read(json!({"scopes": ["x"]})).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }

    #[test]
    fn test_schema_marks_secrets() {
        let schema = schema();
        for name in ["client_id", "client_secret", "refresh_token", "access_token", "id_token"] {
            assert!(schema.attribute(name).unwrap().sensitive, "{} should be sensitive", name);
        }
        assert!(!schema.attribute("scope").unwrap().sensitive);
        assert_eq!(
            schema.attribute("token_url").unwrap().default,
            Some(json!("https://oauth2.googleapis.com/token"))
        );
    }
}
