//! One-shot "service started" notice sent to the admin recipient.

use std::net::{IpAddr, UdpSocket};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use crate::notifier::Notify;
use crate::types::DisplayZone;
use crate::util::time::fmt_epoch;

/// Public address used only to pick the outbound interface; no packet is sent.
const PROBE_TARGET: &str = "8.8.8.8:80";
pub const UNKNOWN_IP: &str = "unknown";

/// Address of the interface the host would use to reach the internet.
#[must_use]
pub fn outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(PROBE_TARGET).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

#[must_use]
pub fn startup_message(ip: &str, timestamp: &str) -> String {
    format!("Se ha iniciado correctamente una sesion desde la IP: {ip}\nFecha: {timestamp}")
}

/// Sends the startup notice. `ip` is `None` when discovery failed.
///
/// The start time is the host's own clock in `zone`; the display offset
/// applied to event clocks does not apply here.
pub async fn announce<N>(
    notifier: &N,
    admin: &str,
    ip: Option<IpAddr>,
    now: DateTime<Utc>,
    zone: DisplayZone,
) where
    N: Notify + ?Sized,
{
    let ip = ip.map_or_else(
        || {
            warn!("could not determine outbound IP address");
            UNKNOWN_IP.to_string()
        },
        |ip| ip.to_string(),
    );
    let message = startup_message(&ip, &fmt_epoch(now.timestamp(), TimeDelta::zero(), zone));
    info!(admin, %ip, "sending startup notice");
    notifier.notify(&message, admin).await;
}

/// Structured replacement for the interactive boot banner.
pub fn log_system_info() {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        pid = std::process::id(),
        "zbx-relay starting"
    );
}
