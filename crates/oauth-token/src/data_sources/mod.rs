//! Data Source Abstraction
//!
//! Every data source is a read-only pipeline from a host configuration object
//! to a [`ResourceData`] record.

pub mod google_access_token;
pub mod refresh_access_token;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::ProviderResult;
use crate::schema::DataSourceSchema;
use crate::state::ResourceData;

pub use google_access_token::GoogleAccessToken;
pub use refresh_access_token::RefreshAccessToken;

/// A read-only data source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name used in configurations (e.g. "oauth_refresh_access_token")
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> DataSourceSchema;

    /// Decode `config` and run one read. Any failure aborts the read and
    /// no record is produced.
    async fn read(&self, config: Value) -> ProviderResult<ResourceData>;
}
