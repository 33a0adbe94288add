#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use chrono::TimeDelta;
use secrecy::ExposeSecret;
use tempfile::NamedTempFile;
use zbx_relay::config::Config;
use zbx_relay::error::{ConfigError, Error as RelayError};
use zbx_relay::types::DisplayZone;
use zbx_relay::zbx_client::ZbxClient;

const FULL: &str = r#"
[zabbix]
url = "https://zabbix.example.com"
token = "file-token"
request_timeout = "7s"

[relay]
url = "http://relay.local:3000/send"
admin_recipient = "5215500000000"
recipients = "5215511111111"
announce_startup = false

[app]
check_interval = 30
clock_offset = "-6h"
timezone = "utc"
"#;

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn toml_file(contents: &str) -> NamedTempFile {
    file_with_suffix(".toml", contents)
}

fn file_with_suffix(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_complete_file() {
    let file = toml_file(FULL);
    let config = Config::load(file.path(), true, &no_env()).expect("config");

    assert_eq!(
        config.zabbix.url.as_str(),
        "https://zabbix.example.com/api_jsonrpc.php"
    );
    assert_eq!(config.zabbix.token.expose_secret(), "file-token");
    assert_eq!(config.zabbix.request_timeout, Duration::from_secs(7));
    assert_eq!(config.zabbix.connect_timeout, Duration::from_secs(3));
    assert_eq!(config.relay.timeout, Duration::from_secs(10));
    assert!(!config.relay.announce_startup);
    assert_eq!(config.check_interval, Duration::from_secs(30));
    assert_eq!(config.clock_offset, TimeDelta::hours(-6));
    assert_eq!(config.timezone, DisplayZone::Utc);
    assert!(config.log_file.is_none());
}

#[test]
fn environment_overrides_file() {
    let file = toml_file(FULL);
    let env = env(&[
        ("ZABBIX_PRD_API_TOKEN", "env-token"),
        ("CHECK_INTERVAL", "15"),
        ("NOTIFICATION_NUMBERS", "5215522222222"),
    ]);

    let config = Config::load(file.path(), true, &env).expect("config");
    assert_eq!(config.zabbix.token.expose_secret(), "env-token");
    assert_eq!(config.interval_secs(), 15);
    assert_eq!(config.relay.recipients, "5215522222222");
}

#[test]
fn required_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = Config::load(&missing, true, &no_env()).expect_err("missing file");
    assert!(matches!(
        err,
        RelayError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[test]
fn optional_file_falls_back_to_environment() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("zbx-relay.toml");
    let env = env(&[
        ("ZABBIX_URL", "https://zabbix.example.com/api_jsonrpc.php"),
        ("ZABBIX_API_TOKEN", "t"),
        ("NOTIFICATION_URL", "http://relay.local/send"),
        ("ADMIN_NUMBER", "1"),
        ("NOTIFICATION_NUMBERS", "2"),
    ]);

    let config = Config::load(&missing, false, &env).expect("config");
    assert_eq!(config.interval_secs(), 10);
    assert_eq!(config.clock_offset, TimeDelta::zero());
    assert_eq!(config.timezone, DisplayZone::Local);
    assert!(config.relay.announce_startup);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = toml_file("[app]\ncheck_interval = \"soon\"\n");
    let err = Config::load(file.path(), true, &no_env()).expect_err("bad file");
    assert!(matches!(err, RelayError::Config(ConfigError::Parse(_))));
}

#[test]
fn plain_http_zabbix_is_allowed_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("zbx-relay.toml");
    let env = env(&[
        ("ZABBIX_URL", "http://zabbix.lan/zabbix"),
        ("ZABBIX_API_TOKEN", "t"),
        ("ZABBIX_INSECURE", "true"),
        ("NOTIFICATION_URL", "http://relay.local/send"),
        ("ADMIN_NUMBER", "1"),
        ("NOTIFICATION_NUMBERS", "2"),
    ]);

    let config = Config::load(&missing, false, &env).expect("config");
    assert!(config.zabbix.insecure_http);
    ZbxClient::new(
        config.zabbix.url,
        config.zabbix.request_timeout,
        config.zabbix.connect_timeout,
        config.zabbix.insecure_http,
    )
    .expect("plain http client");
}

#[test]
fn plain_http_zabbix_is_allowed_from_file() {
    let file = toml_file(&FULL.replace(
        "url = \"https://zabbix.example.com\"",
        "url = \"http://zabbix.lan\"\ninsecure_http = true",
    ));
    let config = Config::load(file.path(), true, &no_env()).expect("config");
    assert!(config.zabbix.insecure_http);
    assert_eq!(config.zabbix.url.scheme(), "http");
}

#[test]
fn plain_http_zabbix_is_refused_by_default() {
    let file = toml_file(&FULL.replace("https://zabbix", "http://zabbix"));
    let config = Config::load(file.path(), true, &no_env()).expect("config");
    assert!(!config.zabbix.insecure_http);
    assert!(
        ZbxClient::new(
            config.zabbix.url,
            config.zabbix.request_timeout,
            config.zabbix.connect_timeout,
            config.zabbix.insecure_http,
        )
        .is_err()
    );
}

const LEGACY_CONF: &str = "\
[DEFAULT]
LOG_FILE = whazabbix.log
CHECK_INTERVAL = 20

[ZABBIX]
URL = https://zabbix.example.com/zabbix
API_TOKEN = conf-token

[WEBWHATSAPP]
URL = http://relay.local:3000/send

[NOTIFICATIONS]
ADMIN_NUMBER = 5215500000000
NOTIFICATION_NUMBERS = 5215511111111
";

#[test]
fn legacy_conf_file_is_read() {
    let file = file_with_suffix(".conf", LEGACY_CONF);
    let config = Config::load(file.path(), true, &no_env()).expect("config");

    assert_eq!(
        config.zabbix.url.as_str(),
        "https://zabbix.example.com/zabbix/api_jsonrpc.php"
    );
    assert_eq!(config.zabbix.token.expose_secret(), "conf-token");
    assert_eq!(config.relay.url.as_str(), "http://relay.local:3000/send");
    assert_eq!(config.relay.admin_recipient, "5215500000000");
    assert_eq!(config.relay.recipients, "5215511111111");
    assert_eq!(config.interval_secs(), 20);
    assert_eq!(
        config.log_file.as_deref(),
        Some(std::path::Path::new("whazabbix.log"))
    );
}

#[test]
fn environment_overrides_legacy_conf() {
    let file = file_with_suffix(".conf", LEGACY_CONF);
    let overrides = env(&[("CHECK_INTERVAL", "5")]);
    let config = Config::load(file.path(), true, &overrides).expect("config");
    assert_eq!(config.interval_secs(), 5);
}

#[test]
fn legacy_conf_with_bad_interval_is_rejected() {
    let contents = LEGACY_CONF.replace("CHECK_INTERVAL = 20", "CHECK_INTERVAL = soon");
    let file = file_with_suffix(".conf", &contents);
    let err = Config::load(file.path(), true, &no_env()).expect_err("bad interval");
    assert!(matches!(
        err,
        RelayError::Config(ConfigError::InvalidField { .. })
    ));
}
