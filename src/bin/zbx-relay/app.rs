use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::signal;
use tracing::{debug, info, warn};
use zbx_relay::Result;
use zbx_relay::config::{Config, SystemEnv};
use zbx_relay::error::{ConfigError, Error as RelayError};
use zbx_relay::notifier::{DryRunNotifier, Notify, RelayNotifier};
use zbx_relay::poll::PollLoop;
use zbx_relay::scanner::{AlertScanner, ScanSettings};
use zbx_relay::startup::{announce, log_system_info, outbound_ip};
use zbx_relay::telemetry::init_tracing;
use zbx_relay::window::SystemClock;
use zbx_relay::zbx_client::ZbxClient;

use super::cli::Cli;

/// Searched in order when `--config` is not given; the first one present wins.
const DEFAULT_CONFIGS: [&str; 2] = ["zbx-relay.toml", "whazabbix.conf"];

pub async fn run(cli: Cli) -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let (config_path, required) = match cli.config.clone() {
        Some(path) => (path, true),
        None => (default_config_path(), false),
    };
    let mut config = Config::load(&config_path, required, &SystemEnv)?;
    if let Some(interval) = cli.interval {
        config.check_interval = validate_interval(interval)?;
    }

    init_tracing(
        cli.log_filter.as_deref(),
        cli.json_logs,
        config.log_file.as_deref(),
    )?;
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "ignoring unreadable .env"),
    }
    log_system_info();
    info!(
        zabbix = %config.zabbix.url,
        relay = %config.relay.url,
        interval_s = config.interval_secs(),
        offset_s = config.clock_offset.num_seconds(),
        timezone = config.timezone.as_str(),
        dry_run = cli.dry_run,
        "configuration loaded"
    );

    let client = ZbxClient::new(
        config.zabbix.url.clone(),
        config.zabbix.request_timeout,
        config.zabbix.connect_timeout,
        cli.insecure || config.zabbix.insecure_http,
    )?;
    let session = client.login(&config.zabbix.token).await?;

    let notifier: Box<dyn Notify> = if cli.dry_run {
        Box::new(DryRunNotifier)
    } else {
        Box::new(RelayNotifier::new(
            config.relay.url.clone(),
            config.relay.timeout,
        )?)
    };

    if config.relay.announce_startup && !cli.no_announce {
        announce(
            notifier.as_ref(),
            &config.relay.admin_recipient,
            outbound_ip(),
            Utc::now(),
            config.timezone,
        )
        .await;
    }

    let scanner = AlertScanner::new(
        client,
        notifier,
        ScanSettings {
            recipients: config.relay.recipients.clone(),
            clock_offset: config.clock_offset,
            timezone: config.timezone,
        },
    );
    let poll = PollLoop::new(scanner, SystemClock, &session, config.check_interval);

    if cli.once {
        let stats = poll.run_cycles(1).await;
        if stats.failed > 0 {
            warn!("single check failed");
        }
        return Ok(());
    }

    tokio::select! {
        () = poll.run() => {}
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, stopping loop");
        }
    }
    Ok(())
}

fn default_config_path() -> PathBuf {
    DEFAULT_CONFIGS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIGS[0]))
}

fn validate_interval(interval: Duration) -> Result<Duration> {
    if interval.subsec_nanos() != 0 || interval.as_secs() == 0 {
        return Err(RelayError::from(ConfigError::InvalidField {
            field: "cli.interval",
            message: "must be a whole number of seconds, at least 1s".to_string(),
        }));
    }
    Ok(interval)
}
