//! Application Default Credentials discovery
//!
//! Resolution order follows gcloud: the file named by
//! `GOOGLE_APPLICATION_CREDENTIALS`, then the well-known file under the gcloud
//! configuration directory. The metadata server fallback is handled by the
//! Google token source, since only that data source can use it.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::paths::{self, CREDENTIALS_ENV};
use crate::common::{ProviderError, ProviderResult};
use crate::debug_log;
use crate::identity::build_hash;

/// Where discovery looks for the ADC document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdcPath {
    FromEnv(PathBuf),
    WellKnown(PathBuf),
}

/// A parsed ADC document.
#[derive(Clone)]
pub struct AdcDocument {
    path: PathBuf,
    raw: String,
    fields: Map<String, Value>,
}

impl AdcDocument {
    /// Parse a credentials document. Only the sorted top-level keys are logged.
    pub fn parse(path: impl Into<PathBuf>, raw: String) -> ProviderResult<Self> {
        let path = path.into();
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            ProviderError::CredentialsUnavailable(format!(
                "{} is not valid JSON: {}",
                path.display(),
                e
            ))
        })?;
        let Value::Object(fields) = value else {
            return Err(ProviderError::CredentialsUnavailable(format!(
                "{} does not contain a JSON object",
                path.display()
            )));
        };

        debug_log::log_document_keys(&fields);

        Ok(Self { path, raw, fields })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The `type` field (`authorized_user`, `service_account`, ...)
    pub fn credential_type(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    /// A top-level string field; absent fields read as empty.
    pub fn string_field(&self, name: &str) -> ProviderResult<String> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(ProviderError::CredentialsUnavailable(format!(
                "field '{}' in {} is not a string",
                name,
                self.path.display()
            ))),
        }
    }

    /// Digest of the document text, used as the record id.
    pub fn identity(&self) -> String {
        build_hash([self.raw.as_bytes()])
    }
}

impl fmt::Debug for AdcDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdcDocument")
            .field("path", &self.path)
            .field("keys", &debug_log::sorted_keys(&self.fields))
            .finish()
    }
}

/// Supplies the default credentials document.
///
/// `Ok(None)` means no document exists at the well-known location, which the
/// Google data source treats as a cue to try the metadata server.
pub trait DefaultCredentialsSource: Send + Sync {
    fn load(&self) -> ProviderResult<Option<AdcDocument>>;
}

/// File-based discovery of Application Default Credentials.
#[derive(Debug, Clone, Default)]
pub struct AdcDiscovery {
    env_path: Option<PathBuf>,
    well_known: Option<PathBuf>,
}

impl AdcDiscovery {
    /// Discovery configured from the process environment and home directory
    pub fn from_env() -> Self {
        let env_path = std::env::var_os(CREDENTIALS_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let well_known = match paths::well_known_adc_path() {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("No well-known ADC location: {}", e);
                None
            }
        };

        Self {
            env_path,
            well_known,
        }
    }

    /// Discovery with explicit locations (useful for testing).
    ///
    /// A `None` well-known path behaves like an unresolvable home directory.
    pub fn with_paths(env_path: Option<PathBuf>, well_known: Option<PathBuf>) -> Self {
        Self {
            env_path,
            well_known,
        }
    }

    pub fn adc_path(&self) -> ProviderResult<AdcPath> {
        if let Some(path) = &self.env_path {
            return Ok(AdcPath::FromEnv(path.clone()));
        }
        self.well_known
            .clone()
            .map(AdcPath::WellKnown)
            .ok_or(ProviderError::HomeDirectoryUnresolvable)
    }
}

impl DefaultCredentialsSource for AdcDiscovery {
    fn load(&self) -> ProviderResult<Option<AdcDocument>> {
        match self.adc_path()? {
            AdcPath::FromEnv(path) => match std::fs::read_to_string(&path) {
                Ok(raw) => AdcDocument::parse(path, raw).map(Some),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(ProviderError::CredentialsUnavailable(format!(
                        "{} does not exist. Check that the `{}` environment variable points to a valid file.",
                        path.display(),
                        CREDENTIALS_ENV
                    )))
                }
                Err(e) => Err(read_failed(&path, e)),
            },
            AdcPath::WellKnown(path) => match std::fs::read_to_string(&path) {
                Ok(raw) => AdcDocument::parse(path, raw).map(Some),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("No ADC file at {}", path.display());
                    Ok(None)
                }
                Err(e) => Err(read_failed(&path, e)),
            },
        }
    }
}

fn read_failed(path: &Path, err: std::io::Error) -> ProviderError {
    ProviderError::CredentialsUnavailable(format!("failed to read {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_env_path_wins() {
        let discovery = AdcDiscovery::with_paths(
            Some(PathBuf::from("/etc/creds.json")),
            Some(PathBuf::from("/home/foo/.config/gcloud/adc.json")),
        );
        assert_eq!(
            discovery.adc_path().unwrap(),
            AdcPath::FromEnv(PathBuf::from("/etc/creds.json"))
        );
    }

    #[test]
    fn test_no_home_is_unresolvable() {
        let discovery = AdcDiscovery::with_paths(None, None);
        assert!(matches!(
            discovery.load(),
            Err(ProviderError::HomeDirectoryUnresolvable)
        ));
    }

    #[test]
    fn test_missing_well_known_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let discovery = AdcDiscovery::with_paths(None, Some(dir.path().join("missing.json")));
        assert!(discovery.load().unwrap().is_none());
    }

    #[test]
    fn test_missing_env_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let discovery = AdcDiscovery::with_paths(Some(dir.path().join("missing.json")), None);
        assert!(matches!(
            discovery.load(),
            Err(ProviderError::CredentialsUnavailable(_))
        ));
    }

    #[test]
    fn test_loads_authorized_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "adc.json",
            r#"{"client_id":"id","client_secret":"secret","refresh_token":"rt","type":"authorized_user"}"#,
        );

        let doc = AdcDiscovery::with_paths(None, Some(path.clone()))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(doc.path(), path.as_path());
        assert_eq!(doc.credential_type(), Some("authorized_user"));
        assert_eq!(doc.string_field("client_id").unwrap(), "id");
        assert_eq!(doc.string_field("quota_project_id").unwrap(), "");
    }

    #[test]
    fn test_invalid_json_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "adc.json", "{not json");
        let result = AdcDiscovery::with_paths(Some(path), None).load();
        assert!(matches!(result, Err(ProviderError::CredentialsUnavailable(_))));
    }

    #[test]
    fn test_non_object_rejected() {
        let result = AdcDocument::parse("adc.json", "[1, 2]".to_string());
        assert!(matches!(result, Err(ProviderError::CredentialsUnavailable(_))));
    }

    #[test]
    fn test_non_string_field_rejected() {
        let doc = AdcDocument::parse("adc.json", r#"{"client_id": 42}"#.to_string()).unwrap();
        assert!(doc.string_field("client_id").is_err());
    }

    #[test]
    fn test_debug_hides_values() {
        let doc = AdcDocument::parse("adc.json", r#"{"refresh_token":"very-secret"}"#.to_string())
            .unwrap();
        let rendered = format!("{:?}", doc);
        assert!(rendered.contains("refresh_token"));
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn test_identity_follows_document_text() {
        let a = AdcDocument::parse("a.json", r#"{"client_id":"a"}"#.to_string()).unwrap();
        let b = AdcDocument::parse("b.json", r#"{"client_id":"a"}"#.to_string()).unwrap();
        let c = AdcDocument::parse("a.json", r#"{"client_id":"c"}"#.to_string()).unwrap();
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
    }
}
