use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{default_connect_timeout, default_port, default_request_timeout};
use super::env::{env_bool, env_duration, env_parse, env_path, env_string};
use super::{Config, Credentials, HttpSettings, HumantimeDuration, LOG_FILE_ENV, SWIS_JSON_PATH};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    let builder = ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .add_source(
            ::config::Environment::with_prefix("ALARM_BRIDGE")
                .separator("__")
                .try_parsing(true),
        );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) swis: RawSwis,
    #[serde(default)]
    pub(super) app: RawApp,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawSwis {
    pub(super) url: Option<String>,
    pub(super) server: Option<String>,
    #[serde(default = "default_port")]
    pub(super) port: u16,
    pub(super) username: Option<String>,
    pub(super) password: Option<String>,
    #[serde(default)]
    pub(super) accept_invalid_certs: bool,
    #[serde(default)]
    pub(super) allow_http: bool,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) request_timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawApp {
    #[serde(default)]
    pub(super) log_file: Option<PathBuf>,
    #[serde(default)]
    pub(super) dry_run: bool,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string("SWIS_URL")? {
            self.swis.url = Some(url);
        }
        if let Some(server) = env_string("SWIS_SERVER")? {
            self.swis.server = Some(server);
        }
        if let Some(port) = env_parse::<u16>("SWIS_PORT")? {
            self.swis.port = port;
        }
        if let Some(username) = env_string("SWIS_USERNAME")? {
            self.swis.username = Some(username);
        }
        if let Some(password) = env_string("SWIS_PASSWORD")? {
            self.swis.password = Some(password);
        }
        if let Some(accept) = env_bool("ALARM_BRIDGE_ACCEPT_INVALID_CERTS")? {
            self.swis.accept_invalid_certs = accept;
        }
        if let Some(allow_http) = env_bool("ALARM_BRIDGE_ALLOW_HTTP")? {
            self.swis.allow_http = allow_http;
        }
        if let Some(timeout) = env_duration("HTTP_TIMEOUT")? {
            self.swis.request_timeout = timeout;
        }
        if let Some(timeout) = env_duration("HTTP_CONNECT_TIMEOUT")? {
            self.swis.connect_timeout = timeout;
        }
        if let Some(path) = env_path(LOG_FILE_ENV)? {
            self.app.log_file = Some(path);
        }
        if let Some(dry_run) = env_bool("ALARM_BRIDGE_DRY_RUN")? {
            self.app.dry_run = dry_run;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let base_url = self.swis.base_url()?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidField {
                field: "swis.url",
                message: format!("unsupported scheme {:?}", base_url.scheme()),
            }
            .into());
        }
        if base_url.scheme() == "http" && !self.swis.allow_http {
            return Err(ConfigError::InvalidField {
                field: "swis.url",
                message: "only https URLs are accepted unless allow_http is set".to_string(),
            }
            .into());
        }

        let username = self.swis.username.ok_or(ConfigError::MissingField {
            field: "swis.username",
        })?;
        if username.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "swis.username",
                message: "username cannot be empty".to_string(),
            }
            .into());
        }
        let password = self.swis.password.ok_or(ConfigError::MissingField {
            field: "swis.password",
        })?;

        if self.swis.request_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "swis.request_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.swis.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "swis.connect_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            base_url,
            credentials: Credentials {
                username,
                password: password.into(),
            },
            http: HttpSettings {
                request_timeout: self.swis.request_timeout,
                connect_timeout: self.swis.connect_timeout,
                accept_invalid_certs: self.swis.accept_invalid_certs,
                allow_http: self.swis.allow_http,
            },
            log_file: self.app.log_file,
            dry_run: self.app.dry_run,
        })
    }
}

impl RawSwis {
    /// An explicit `url` wins; otherwise the URL is derived from `server`.
    fn base_url(&self) -> std::result::Result<Url, ConfigError> {
        let candidate = match (&self.url, &self.server) {
            (Some(url), _) => url.trim().to_string(),
            (None, Some(server)) => {
                format!("https://{}:{}{SWIS_JSON_PATH}", server.trim(), self.port)
            }
            (None, None) => return Err(ConfigError::MissingField { field: "swis.url" }),
        };
        Url::parse(&candidate).map_err(|err| ConfigError::InvalidField {
            field: "swis.url",
            message: err.to_string(),
        })
    }
}

impl Default for RawSwis {
    fn default() -> Self {
        Self {
            url: None,
            server: None,
            port: default_port(),
            username: None,
            password: None,
            accept_invalid_certs: false,
            allow_http: false,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}
