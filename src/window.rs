use chrono::{DateTime, Utc};

use crate::types::PollWindow;

/// Source of wall-clock time for window computation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Window ending at `now` truncated to the second, `interval_secs` wide.
#[must_use]
pub fn get_window(now: DateTime<Utc>, interval_secs: u64) -> PollWindow {
    let till = now.timestamp();
    let width = i64::try_from(interval_secs).unwrap_or(i64::MAX);
    PollWindow {
        from: till.saturating_sub(width),
        till,
    }
}
