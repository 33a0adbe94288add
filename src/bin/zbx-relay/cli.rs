use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(author, version, about = "Zabbix alert relay to a messaging gateway", long_about = None)]
pub struct Cli {
    /// TOML configuration file. Defaults to `zbx-relay.toml` when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run a single check cycle and exit.
    #[arg(long, action = ArgAction::SetTrue)]
    pub once: bool,

    /// Override the check interval (whole seconds, e.g. "30s").
    #[arg(long, value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Allow plain HTTP for the Zabbix API.
    #[arg(long, action = ArgAction::SetTrue)]
    pub insecure: bool,

    /// Log notifications instead of sending them.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Skip the startup notice to the admin recipient.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_announce: bool,

    /// Emit JSON logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "zbx_relay=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
