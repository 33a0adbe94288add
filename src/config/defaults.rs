use std::time::Duration;

pub(super) const fn default_check_interval() -> u64 {
    10
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(3)
}

pub(super) const fn default_relay_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_announce_startup() -> bool {
    true
}
