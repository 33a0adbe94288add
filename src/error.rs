use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("authentication against Zabbix failed")]
    Auth(#[source] ZbxError),
    #[error(transparent)]
    Zabbix(#[from] ZbxError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {path} not found")]
    FileNotFound { path: PathBuf },
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
pub enum ZbxError {
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
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("Zabbix API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("missing field in API response: {field}")]
    MissingField { field: &'static str },
    #[error("token rejected by the server")]
    Rejected,
    #[error("retry budget exhausted")]
    RetryExhausted {
        #[source]
        source: Box<ZbxError>,
    },
}

/// Relay failures. Only `Client` can escape the notifier, at construction.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build relay HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("relay request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("relay answered with HTTP status {status}")]
    HttpStatus { status: reqwest::StatusCode },
}

impl From<reqwest::Error> for ZbxError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}
