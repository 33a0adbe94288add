use std::collections::HashMap;
use std::time::Duration;

use chrono::TimeDelta;
use humantime::parse_duration;

use crate::error::ConfigError;

use super::parse_signed_duration;

/// Lookup of environment variables, injectable so configuration loading can
/// be exercised without touching the process environment.
pub trait EnvSource {
    /// # Errors
    ///
    /// Returns an error when the variable exists but cannot be read.
    fn var(&self, key: &'static str) -> std::result::Result<Option<String>, ConfigError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(err) => Err(ConfigError::Other(format!("{key}: {err}"))),
        }
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
        Ok(self.get(key).cloned())
    }
}

/// First non-blank value among `keys`, in order.
pub(super) fn env_string(
    env: &dyn EnvSource,
    keys: &[&'static str],
) -> std::result::Result<Option<String>, ConfigError> {
    for &key in keys {
        if let Some(value) = env.var(key)? {
            if !value.trim().is_empty() {
                return Ok(Some(value.trim().to_string()));
            }
        }
    }
    Ok(None)
}

pub(super) fn env_parse<T>(
    env: &dyn EnvSource,
    key: &'static str,
) -> std::result::Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(env, &[key])?
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|err| ConfigError::InvalidField {
                    field: key,
                    message: format!("{value:?}: {err}"),
                })
        })
        .transpose()
}

pub(super) fn env_bool(
    env: &dyn EnvSource,
    key: &'static str,
) -> std::result::Result<Option<bool>, ConfigError> {
    env_parse::<bool>(env, key)
}

pub(super) fn env_duration(
    env: &dyn EnvSource,
    key: &'static str,
) -> std::result::Result<Option<Duration>, ConfigError> {
    env_string(env, &[key])?
        .map(|value| {
            parse_duration(&value).map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            })
        })
        .transpose()
}

pub(super) fn env_offset(
    env: &dyn EnvSource,
    key: &'static str,
) -> std::result::Result<Option<TimeDelta>, ConfigError> {
    env_string(env, &[key])?
        .map(|value| {
            parse_signed_duration(&value)
                .map_err(|message| ConfigError::InvalidField { field: key, message })
        })
        .transpose()
}
