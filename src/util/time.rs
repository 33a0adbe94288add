use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

use crate::types::DisplayZone;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats an epoch (seconds) as wall-clock time in `zone`, shifted by `offset`.
#[must_use]
pub fn fmt_epoch(sec: i64, offset: TimeDelta, zone: DisplayZone) -> String {
    let shifted = DateTime::<Utc>::from_timestamp(sec, 0)
        .and_then(|utc| utc.checked_add_signed(offset));
    match (shifted, zone) {
        (Some(t), DisplayZone::Utc) => t.format(TIMESTAMP_FORMAT).to_string(),
        (Some(t), DisplayZone::Local) => Local
            .from_utc_datetime(&t.naive_utc())
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        (None, _) => format!("(invalid timestamp: {sec})"),
    }
}
