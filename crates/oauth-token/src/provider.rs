//! Provider
//!
//! Registry of the data sources this provider exposes, keyed by type name.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::common::{create_http_client, ProviderError, ProviderResult};
use crate::credentials::{AdcDiscovery, DefaultCredentialsSource};
use crate::data_sources::{DataSource, GoogleAccessToken, RefreshAccessToken};
use crate::google::MetadataServer;
use crate::schema::DataSourceSchema;
use crate::state::DataSourceState;

pub struct Provider {
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Provider {
    /// Provider with both built-in data sources, discovering credentials
    /// from the process environment.
    pub fn new() -> ProviderResult<Self> {
        Ok(Self::with_sources(
            create_http_client()?,
            Arc::new(AdcDiscovery::from_env()),
            MetadataServer::from_env(),
        ))
    }

    /// Provider with explicit dependencies (useful for testing).
    pub fn with_sources(
        client: Client,
        credentials: Arc<dyn DefaultCredentialsSource>,
        metadata: MetadataServer,
    ) -> Self {
        let mut provider = Self {
            data_sources: BTreeMap::new(),
        };
        provider.register(Box::new(RefreshAccessToken::new(
            client.clone(),
            Arc::clone(&credentials),
        )));
        provider.register(Box::new(GoogleAccessToken::new(client, credentials, metadata)));
        provider
    }

    fn register(&mut self, data_source: Box<dyn DataSource>) {
        self.data_sources.insert(data_source.type_name(), data_source);
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(type_name).map(|ds| &**ds)
    }

    /// Type names of all data sources, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    pub fn schema(&self) -> BTreeMap<&'static str, DataSourceSchema> {
        self.data_sources
            .iter()
            .map(|(name, ds)| (*name, ds.schema()))
            .collect()
    }

    /// Read one data source.
    pub async fn read(&self, type_name: &str, config: Value) -> ProviderResult<DataSourceState> {
        let data_source = self
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownDataSource(type_name.to_string()))?;

        info!(data_source = type_name, "Reading data source");
        data_source.read(config).await?.into_state()
    }
}
