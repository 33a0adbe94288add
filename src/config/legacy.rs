//! INI layout of the older `whazabbix.conf` deployments.
//!
//! ```ini
//! [DEFAULT]
//! LOG_FILE = whazabbix.log
//! CHECK_INTERVAL = 10
//! [ZABBIX]
//! URL = https://zabbix.example.com
//! API_TOKEN = ...
//! [WEBWHATSAPP]
//! URL = http://relay.local:3000/send
//! [NOTIFICATIONS]
//! ADMIN_NUMBER = 5215500000000
//! NOTIFICATION_NUMBERS = 5215511111111
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use ::config::{Config as Layered, ConfigError as SourceError, File, FileFormat};

use crate::error::ConfigError;

use super::raw::RawConfig;

/// `.conf` and `.ini` files are read with the legacy layout.
pub(super) fn is_legacy_ini(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("conf") || ext.eq_ignore_ascii_case("ini"))
}

pub(super) fn load(path: &Path) -> Result<RawConfig, ConfigError> {
    let source = Layered::builder()
        .add_source(File::from(path).format(FileFormat::Ini).required(false))
        .build()
        .map_err(|err| ConfigError::Parse(err.to_string()))?;

    let mut raw = RawConfig::default();
    if let Some(log_file) = lookup(&source, "DEFAULT", "LOG_FILE")? {
        raw.app.log_file = Some(PathBuf::from(log_file));
    }
    if let Some(interval) = lookup(&source, "DEFAULT", "CHECK_INTERVAL")? {
        raw.app.check_interval = interval.parse().map_err(|err| ConfigError::InvalidField {
            field: "DEFAULT.CHECK_INTERVAL",
            message: format!("{interval:?}: {err}"),
        })?;
    }
    raw.zabbix.url = lookup(&source, "ZABBIX", "URL")?;
    raw.zabbix.token = lookup(&source, "ZABBIX", "API_TOKEN")?;
    raw.relay.url = lookup(&source, "WEBWHATSAPP", "URL")?;
    raw.relay.admin_recipient = lookup(&source, "NOTIFICATIONS", "ADMIN_NUMBER")?;
    raw.relay.recipients = lookup(&source, "NOTIFICATIONS", "NOTIFICATION_NUMBERS")?;
    Ok(raw)
}

/// Section and key names are matched as written or lowercased.
fn lookup(source: &Layered, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
    let candidates = [
        format!("{section}.{key}"),
        format!("{section}.{}", key.to_ascii_lowercase()),
        format!(
            "{}.{}",
            section.to_ascii_lowercase(),
            key.to_ascii_lowercase()
        ),
    ];
    for candidate in &candidates {
        match source.get_string(candidate) {
            Ok(value) if !value.trim().is_empty() => return Ok(Some(value.trim().to_string())),
            Ok(_) | Err(SourceError::NotFound(_)) => {}
            Err(err) => return Err(ConfigError::Parse(err.to_string())),
        }
    }
    Ok(None)
}
