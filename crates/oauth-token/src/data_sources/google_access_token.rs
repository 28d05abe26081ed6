//! `oauth_google_access_token`
//!
//! Access token derived from Google Application Default Credentials.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::DataSource;
use crate::common::ProviderResult;
use crate::config::{decode_config, defaults, GoogleAccessTokenConfig};
use crate::credentials::DefaultCredentialsSource;
use crate::google::{MetadataServer, TokenSource};
use crate::mapper;
use crate::schema::{Attribute, AttributeType, DataSourceSchema};
use crate::state::ResourceData;

pub const TYPE_NAME: &str = "oauth_google_access_token";

pub const OUTPUT_FIELDS: &[&str] = &["access_token", "token_type"];

pub fn schema() -> DataSourceSchema {
    DataSourceSchema::new(
        TYPE_NAME,
        "Access token from Google Application Default Credentials",
        vec![
            Attribute::argument("scopes", AttributeType::StringList)
                .describe("OAuth scopes requested for service account and metadata server credentials")
                .with_default(defaults::scopes()),
            Attribute::computed("access_token").sensitive(),
            Attribute::computed("token_type"),
        ],
    )
}

pub struct GoogleAccessToken {
    client: Client,
    credentials: Arc<dyn DefaultCredentialsSource>,
    metadata: MetadataServer,
}

impl GoogleAccessToken {
    pub fn new(
        client: Client,
        credentials: Arc<dyn DefaultCredentialsSource>,
        metadata: MetadataServer,
    ) -> Self {
        Self {
            client,
            credentials,
            metadata,
        }
    }

    pub async fn read_config(&self, config: &GoogleAccessTokenConfig) -> ProviderResult<ResourceData> {
        let source = TokenSource::discover(self.credentials.as_ref(), &self.metadata)?;
        let token = source.token(&self.client, &config.scopes).await?;

        let mut data = ResourceData::new(schema());
        mapper::apply_token(&mut data, &token, OUTPUT_FIELDS, source.identity())?;
        Ok(data)
    }
}

#[async_trait]
impl DataSource for GoogleAccessToken {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> DataSourceSchema {
        schema()
    }

    async fn read(&self, config: Value) -> ProviderResult<ResourceData> {
        let config: GoogleAccessTokenConfig = decode_config(&schema(), config)?;
        self.read_config(&config).await
    }
}
