//! Path Utilities
//!
//! Locations of gcloud's Application Default Credentials file.

use std::path::{Path, PathBuf};

use super::error::ProviderError;
use super::result::ProviderResult;

/// Environment variable naming an explicit ADC file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

pub const ADC_FILE_NAME: &str = "application_default_credentials.json";

/// Get the gcloud configuration directory
///
/// `~/.config/gcloud` on Linux and macOS, `%APPDATA%\gcloud` on Windows.
pub fn gcloud_config_dir() -> ProviderResult<PathBuf> {
    if cfg!(windows) {
        return dirs::config_dir()
            .map(|appdata| appdata.join("gcloud"))
            .ok_or(ProviderError::HomeDirectoryUnresolvable);
    }

    let home = dirs::home_dir().ok_or(ProviderError::HomeDirectoryUnresolvable)?;
    Ok(gcloud_config_dir_in(&home))
}

/// gcloud configuration directory below a given home directory
pub fn gcloud_config_dir_in(home: &Path) -> PathBuf {
    home.join(".config").join("gcloud")
}

/// Get the well-known ADC path written by `gcloud auth application-default login`
pub fn well_known_adc_path() -> ProviderResult<PathBuf> {
    Ok(gcloud_config_dir()?.join(ADC_FILE_NAME))
}
