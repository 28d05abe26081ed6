//! OAuth2 access token data sources.
//!
//! Two read-only data sources produce access tokens:
//!
//! * `oauth_refresh_access_token` runs a refresh-token grant against a
//!   configurable token endpoint, with credentials taken from configuration
//!   or from gcloud's Application Default Credentials.
//! * `oauth_google_access_token` derives a token from Google Application
//!   Default Credentials (user credentials, service account keys, or the GCE
//!   metadata server).
//!
//! Each read is one linear pass: resolve credentials, POST to the token
//! endpoint, read the body, map the fields.

pub mod common;
pub mod config;
pub mod credentials;
pub mod data_sources;
pub mod debug_log;
pub mod exchange;
pub mod google;
pub mod identity;
pub mod mapper;
pub mod provider;
pub mod schema;
pub mod state;

pub use common::{ErrorCode, ProviderError, ProviderResult};
pub use credentials::{AdcDiscovery, CredentialSet, DefaultCredentialsSource};
pub use data_sources::DataSource;
pub use provider::Provider;
pub use schema::DataSourceSchema;
pub use state::{DataSourceState, ResourceData};
