use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;
use crate::types::DisplayZone;

use super::defaults::{
    default_announce_startup, default_check_interval, default_connect_timeout,
    default_relay_timeout, default_request_timeout,
};
use super::env::{EnvSource, env_bool, env_duration, env_offset, env_parse, env_string};
use super::legacy;
use super::{
    Config, HumantimeDuration, RelaySettings, SignedHumantime, ZabbixSettings, normalize_api_url,
};

pub(super) fn load(
    path: impl AsRef<Path>,
    required: bool,
) -> std::result::Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    if required && !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if legacy::is_legacy_ini(path) {
        return legacy::load(path);
    }

    ::config::Config::builder()
        .add_source(
            ::config::File::from(path)
                .format(::config::FileFormat::Toml)
                .required(false),
        )
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) zabbix: RawZabbix,
    #[serde(default)]
    pub(super) relay: RawRelay,
    #[serde(default)]
    pub(super) app: RawApp,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawZabbix {
    pub(super) url: Option<String>,
    pub(super) token: Option<String>,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) request_timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
    #[serde(default)]
    pub(super) insecure_http: bool,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawRelay {
    pub(super) url: Option<String>,
    pub(super) admin_recipient: Option<String>,
    pub(super) recipients: Option<String>,
    #[serde(default = "default_relay_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
    #[serde(default = "default_announce_startup")]
    pub(super) announce_startup: bool,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_check_interval")]
    pub(super) check_interval: u64,
    #[serde(default)]
    #[serde_as(as = "Option<SignedHumantime>")]
    pub(super) clock_offset: Option<TimeDelta>,
    #[serde(default)]
    pub(super) timezone: Option<String>,
    #[serde(default)]
    pub(super) log_file: Option<PathBuf>,
}

impl RawConfig {
    /// Environment names follow both historical deployments so existing
    /// `.env` files keep working.
    pub(super) fn apply_env_overrides(
        &mut self,
        env: &dyn EnvSource,
    ) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string(env, &["ZABBIX_URL", "ZABBIX_URL_PRD"])? {
            self.zabbix.url = Some(url);
        }
        if let Some(token) = env_string(env, &["ZABBIX_API_TOKEN", "ZABBIX_PRD_API_TOKEN"])? {
            self.zabbix.token = Some(token);
        }
        if let Some(timeout) = env_duration(env, "ZABBIX_TIMEOUT")? {
            self.zabbix.request_timeout = timeout;
        }
        if let Some(insecure) = env_bool(env, "ZABBIX_INSECURE")? {
            self.zabbix.insecure_http = insecure;
        }
        if let Some(url) = env_string(env, &["NOTIFICATION_URL"])? {
            self.relay.url = Some(url);
        }
        if let Some(admin) = env_string(env, &["ADMIN_NUMBER"])? {
            self.relay.admin_recipient = Some(admin);
        }
        if let Some(recipients) = env_string(env, &["NOTIFICATION_NUMBERS"])? {
            self.relay.recipients = Some(recipients);
        }
        if let Some(announce) = env_bool(env, "ANNOUNCE_STARTUP")? {
            self.relay.announce_startup = announce;
        }
        if let Some(interval) = env_parse::<u64>(env, "CHECK_INTERVAL")? {
            self.app.check_interval = interval;
        }
        if let Some(offset) = env_offset(env, "CLOCK_OFFSET")? {
            self.app.clock_offset = Some(offset);
        }
        if let Some(zone) = env_string(env, &["TIMEZONE"])? {
            self.app.timezone = Some(zone);
        }
        if let Some(log_file) = env_string(env, &["LOG_FILE"])? {
            self.app.log_file = Some(PathBuf::from(log_file));
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let url_str = self.zabbix.url.ok_or(ConfigError::MissingField {
            field: "zabbix.url",
        })?;
        let zabbix_url = Url::parse(&url_str).map_err(|err| ConfigError::InvalidField {
            field: "zabbix.url",
            message: err.to_string(),
        })?;
        let token = self.zabbix.token.ok_or(ConfigError::MissingField {
            field: "zabbix.token",
        })?;
        if token.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "zabbix.token",
                message: "token cannot be empty".to_string(),
            }
            .into());
        }
        non_zero("zabbix.request_timeout", self.zabbix.request_timeout)?;
        non_zero("zabbix.connect_timeout", self.zabbix.connect_timeout)?;

        let relay_str = self.relay.url.ok_or(ConfigError::MissingField {
            field: "relay.url",
        })?;
        let relay_url = Url::parse(&relay_str).map_err(|err| ConfigError::InvalidField {
            field: "relay.url",
            message: err.to_string(),
        })?;
        let admin_recipient = required_text("relay.admin_recipient", self.relay.admin_recipient)?;
        let recipients = required_text("relay.recipients", self.relay.recipients)?;
        non_zero("relay.timeout", self.relay.timeout)?;

        if self.app.check_interval == 0 {
            return Err(ConfigError::InvalidField {
                field: "app.check_interval",
                message: "check interval must be at least one second".to_string(),
            }
            .into());
        }

        let timezone = match self.app.timezone {
            Some(raw) => {
                DisplayZone::from_str(&raw).map_err(|message| ConfigError::InvalidField {
                    field: "app.timezone",
                    message,
                })?
            }
            None => DisplayZone::default(),
        };

        Ok(Config {
            zabbix: ZabbixSettings {
                url: normalize_api_url(zabbix_url),
                token: token.into(),
                request_timeout: self.zabbix.request_timeout,
                connect_timeout: self.zabbix.connect_timeout,
                insecure_http: self.zabbix.insecure_http,
            },
            relay: RelaySettings {
                url: relay_url,
                admin_recipient,
                recipients,
                timeout: self.relay.timeout,
                announce_startup: self.relay.announce_startup,
            },
            check_interval: Duration::from_secs(self.app.check_interval),
            clock_offset: self.app.clock_offset.unwrap_or_else(TimeDelta::zero),
            timezone,
            log_file: self.app.log_file,
        })
    }
}

fn non_zero(field: &'static str, value: Duration) -> std::result::Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::InvalidField {
            field,
            message: "duration must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn required_text(
    field: &'static str,
    value: Option<String>,
) -> std::result::Result<String, ConfigError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(_) => Err(ConfigError::InvalidField {
            field,
            message: "value cannot be empty".to_string(),
        }),
        None => Err(ConfigError::MissingField { field }),
    }
}

impl Default for RawZabbix {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            insecure_http: false,
        }
    }
}

impl Default for RawRelay {
    fn default() -> Self {
        Self {
            url: None,
            admin_recipient: None,
            recipients: None,
            timeout: default_relay_timeout(),
            announce_startup: default_announce_startup(),
        }
    }
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            clock_offset: None,
            timezone: None,
            log_file: None,
        }
    }
}
