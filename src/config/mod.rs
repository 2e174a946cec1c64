use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error as BridgeError;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

/// Path of the SWIS JSON endpoint below the Orion server.
pub const SWIS_JSON_PATH: &str = "/SolarWinds/InformationService/v3/Json";

const LOG_FILE_ENV: &str = "ALARM_BRIDGE_LOG_FILE";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub credentials: Credentials,
    pub http: HttpSettings,
    pub log_file: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Skip TLS certificate validation (self-signed Orion certificates).
    pub accept_invalid_certs: bool,
    /// Permit plain `http://` base URLs.
    pub allow_http: bool,
}

impl Config {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(BridgeError::from)?;
        raw.apply_env_overrides().map_err(BridgeError::from)?;
        raw.validate_and_build()
    }

    /// Resolve only the log file, without validating anything else, so that
    /// a broken configuration can still be reported there.
    ///
    /// `ALARM_BRIDGE_LOG_FILE` wins over `app.log_file` from the file or the
    /// `ALARM_BRIDGE__APP__LOG_FILE` variable.
    #[must_use]
    pub fn log_file_from_env_and_file(path: impl AsRef<Path>) -> Option<PathBuf> {
        if let Ok(Some(log_file)) = env::env_path(LOG_FILE_ENV) {
            return Some(log_file);
        }
        raw::load(path).ok().and_then(|raw| raw.app.log_file)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: defaults::default_request_timeout(),
            connect_timeout: defaults::default_connect_timeout(),
            accept_invalid_certs: false,
            allow_http: false,
        }
    }
}
