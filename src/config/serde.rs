use std::time::Duration;

use chrono::TimeDelta;
use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

pub(crate) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}

/// Humantime duration with an optional leading sign, e.g. `"-6h"`.
pub(crate) struct SignedHumantime;

impl<'de> DeserializeAs<'de, TimeDelta> for SignedHumantime {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<TimeDelta, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_signed_duration(&raw).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn parse_signed_duration(raw: &str) -> std::result::Result<TimeDelta, String> {
    let raw = raw.trim();
    let (negative, magnitude) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let duration = parse_duration(magnitude.trim()).map_err(|err| err.to_string())?;
    let delta = TimeDelta::from_std(duration).map_err(|err| err.to_string())?;
    Ok(if negative { -delta } else { delta })
}
