use async_trait::async_trait;

use crate::Result;
use crate::types::{Event, PollWindow, Problem};

use super::Session;

/// Read side of the monitoring backend used by the alert scanner.
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Events that occurred inside `window`, newest first, hosts attached.
    /// Not filtered by value.
    async fn list_resolved_events(&self, session: &Session, window: PollWindow)
    -> Result<Vec<Event>>;

    /// Recent problems inside `window`, newest first.
    async fn list_open_problems(&self, session: &Session, window: PollWindow)
    -> Result<Vec<Problem>>;

    /// Host names of one event, or the `Unknown` placeholder.
    async fn get_event_hosts(&self, session: &Session, event_id: &str) -> Result<Vec<String>>;
}
