use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_HOST: &str = "Unknown";

/// Half-open `[from, till)` interval of Unix seconds queried in one cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollWindow {
    pub from: i64,
    pub till: i64,
}

impl PollWindow {
    #[must_use]
    pub const fn width(self) -> i64 {
        self.till - self.from
    }

    /// Inclusive upper bound for APIs that take closed ranges.
    #[must_use]
    pub const fn last_second(self) -> i64 {
        self.till - 1
    }
}

impl Display for PollWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.till)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventValue {
    Ok,
    Problem,
    Other(u8),
}

impl EventValue {
    #[must_use]
    pub const fn from_zabbix(code: u8) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Problem,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Host {
    pub host_id: String,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub event_id: String,
    pub name: String,
    pub clock: i64,
    pub value: EventValue,
    pub hosts: Vec<Host>,
}

impl Event {
    /// Names of the attached hosts, or the placeholder when none came back.
    #[must_use]
    pub fn host_names(&self) -> Vec<String> {
        if self.hosts.is_empty() {
            return vec![UNKNOWN_HOST.to_string()];
        }
        self.hosts.iter().map(|h| h.name.clone()).collect()
    }
}

/// Open problem. Shares its id with the originating event; carries no hosts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Problem {
    pub event_id: String,
    pub name: String,
    pub clock: i64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlertKind {
    Resolved,
    Active,
}

impl AlertKind {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Resolved => "✅ Se resuelve alerta\n",
            Self::Active => "⚠️ Se detecta alerta, ya en revisión\n",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Active => "active",
        }
    }
}

impl Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zone used to render event clocks in messages.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

impl DisplayZone {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Utc => "utc",
        }
    }
}

impl Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" | "gmt" => Ok(Self::Utc),
            other => Err(format!("unknown timezone: {other}")),
        }
    }
}
