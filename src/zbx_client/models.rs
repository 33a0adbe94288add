use serde::Deserialize;

use crate::types::{Event, EventValue, Host, Problem, UNKNOWN_HOST};

/// Row of `event.get` with `selectHosts`. Zabbix sends numbers as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEvent {
    #[serde(rename = "eventid")]
    pub(crate) event_id: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(deserialize_with = "deserialize_i64")]
    pub(crate) clock: i64,
    #[serde(deserialize_with = "deserialize_u8")]
    pub(crate) value: u8,
    #[serde(default)]
    pub(crate) hosts: Vec<HostRow>,
}

impl From<RawEvent> for Event {
    fn from(value: RawEvent) -> Self {
        Self {
            event_id: value.event_id,
            name: value.name,
            clock: value.clock,
            value: EventValue::from_zabbix(value.value),
            hosts: value.hosts.into_iter().map(Host::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProblem {
    #[serde(rename = "eventid")]
    pub(crate) event_id: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(deserialize_with = "deserialize_i64")]
    pub(crate) clock: i64,
}

impl From<RawProblem> for Problem {
    fn from(value: RawProblem) -> Self {
        Self {
            event_id: value.event_id,
            name: value.name,
            clock: value.clock,
        }
    }
}

/// Host lookup row; only the host list matters.
#[derive(Debug, Deserialize)]
pub(crate) struct EventWithHosts {
    #[serde(default)]
    pub(crate) hosts: Vec<HostRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostRow {
    #[serde(default, rename = "hostid")]
    host_id: Option<String>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<HostRow> for Host {
    fn from(value: HostRow) -> Self {
        let HostRow {
            host_id,
            host,
            name,
        } = value;
        let name = name
            .filter(|n| !n.is_empty())
            .or(host)
            .unwrap_or_else(|| UNKNOWN_HOST.to_string());
        Self {
            host_id: host_id.unwrap_or_default(),
            name,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Str(String),
}

fn deserialize_i64<'de, D>(de: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match NumberOrString::deserialize(de)? {
        NumberOrString::Int(value) => Ok(value),
        NumberOrString::Str(value) => value.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn deserialize_u8<'de, D>(de: D) -> std::result::Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = deserialize_i64(de)?;
    u8::try_from(value).map_err(serde::de::Error::custom)
}
