use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Swis(#[from] SwisError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SwisError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status} ({body})")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("missing field in API response: {field}")]
    MissingField { field: &'static str },
    #[error("no node found matching {key} = {value:?}")]
    NodeNotFound { key: &'static str, value: String },
}

impl From<reqwest::Error> for SwisError {
    fn from(source: reqwest::Error) -> Self {
        Self::Request { source }
    }
}

impl Error {
    /// `true` when the remote API reported no node for the alarm target.
    #[must_use]
    pub const fn is_node_not_found(&self) -> bool {
        matches!(self, Self::Swis(SwisError::NodeNotFound { .. }))
    }
}
