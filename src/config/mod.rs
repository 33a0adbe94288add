use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error as AlertError;
use crate::types::DisplayZone;

mod defaults;
mod env;
mod legacy;
mod raw;
mod serde;

pub use env::{EnvSource, SystemEnv};
pub(crate) use serde::{HumantimeDuration, SignedHumantime, parse_signed_duration};

const API_ENDPOINT: &str = "api_jsonrpc.php";

#[derive(Debug, Clone)]
pub struct Config {
    pub zabbix: ZabbixSettings,
    pub relay: RelaySettings,
    /// Poll cadence and window width. Always a whole number of seconds.
    pub check_interval: Duration,
    pub clock_offset: TimeDelta,
    pub timezone: DisplayZone,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ZabbixSettings {
    pub url: Url,
    pub token: SecretString,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Accept a plain `http://` API URL.
    pub insecure_http: bool,
}

#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub url: Url,
    pub admin_recipient: String,
    pub recipients: String,
    pub timeout: Duration,
    pub announce_startup: bool,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is tolerated unless `required` is set, so a deployment
    /// can be configured from the environment alone.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is required but absent, cannot be
    /// parsed, when an environment override is malformed, or when the
    /// resulting values fail validation.
    pub fn load(path: impl AsRef<Path>, required: bool, env: &dyn EnvSource) -> Result<Self> {
        let mut raw = raw::load(path, required).map_err(AlertError::from)?;
        raw.apply_env_overrides(env).map_err(AlertError::from)?;
        raw.validate_and_build()
    }

    /// Poll interval in whole seconds, as used for the query window.
    #[must_use]
    pub const fn interval_secs(&self) -> u64 {
        self.check_interval.as_secs()
    }
}

/// Accepts either the server root or the full JSON-RPC endpoint.
fn normalize_api_url(mut url: Url) -> Url {
    if url.path().ends_with(API_ENDPOINT) {
        return url;
    }
    let path = format!("{}/{API_ENDPOINT}", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}
