use async_trait::async_trait;
use chrono::TimeDelta;
use tracing::info;

use crate::Result;
use crate::error::Error;
use crate::notifier::Notify;
use crate::poll::CycleRunner;
use crate::types::{AlertKind, DisplayZone, PollWindow};
use crate::util::time::fmt_epoch;
use crate::zbx_client::{MonitoringApi, Session};

#[derive(Clone, Debug)]
pub struct ScanSettings {
    /// Sent verbatim as the relay `phone` field.
    pub recipients: String,
    pub clock_offset: TimeDelta,
    pub timezone: DisplayZone,
}

/// Notifications emitted by one cycle, per pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CycleReport {
    pub resolved: usize,
    pub active: usize,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    Failed(Error),
}

impl CycleOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub struct AlertScanner<M, N> {
    api: M,
    notifier: N,
    settings: ScanSettings,
}

impl<M, N> AlertScanner<M, N>
where
    M: MonitoringApi,
    N: Notify,
{
    pub const fn new(api: M, notifier: N, settings: ScanSettings) -> Self {
        Self {
            api,
            notifier,
            settings,
        }
    }

    /// Resolved pass then active pass. The first query error aborts the
    /// cycle; notifications already sent stay sent.
    ///
    /// # Errors
    ///
    /// Propagates any monitoring API failure.
    pub async fn scan(&self, session: &Session, window: PollWindow) -> Result<CycleReport> {
        let resolved = self.resolved_pass(session, window).await?;
        let active = self.active_pass(session, window).await?;
        Ok(CycleReport { resolved, active })
    }

    async fn resolved_pass(&self, session: &Session, window: PollWindow) -> Result<usize> {
        let events = self.api.list_resolved_events(session, window).await?;
        let mut sent = 0;
        for event in events.iter().filter(|e| e.value.is_resolved()) {
            let hosts = event.host_names();
            self.dispatch(AlertKind::Resolved, &event.event_id, &event.name, &hosts, event.clock)
                .await;
            sent += 1;
        }
        Ok(sent)
    }

    async fn active_pass(&self, session: &Session, window: PollWindow) -> Result<usize> {
        let problems = self.api.list_open_problems(session, window).await?;
        let mut sent = 0;
        for problem in &problems {
            let hosts = self.api.get_event_hosts(session, &problem.event_id).await?;
            self.dispatch(
                AlertKind::Active,
                &problem.event_id,
                &problem.name,
                &hosts,
                problem.clock,
            )
            .await;
            sent += 1;
        }
        Ok(sent)
    }

    async fn dispatch(
        &self,
        kind: AlertKind,
        event_id: &str,
        name: &str,
        hosts: &[String],
        clock: i64,
    ) {
        let message = format_message(
            kind,
            name,
            hosts,
            clock,
            self.settings.clock_offset,
            self.settings.timezone,
        );
        info!(%kind, event_id, "{message}");
        self.notifier
            .notify(&message, &self.settings.recipients)
            .await;
    }
}

#[async_trait]
impl<M, N> CycleRunner for AlertScanner<M, N>
where
    M: MonitoringApi,
    N: Notify,
{
    async fn run_cycle(&self, session: &Session, window: PollWindow) -> CycleOutcome {
        match self.scan(session, window).await {
            Ok(report) => CycleOutcome::Completed(report),
            Err(err) => CycleOutcome::Failed(err),
        }
    }
}

/// Notification text. Pure function of its inputs.
#[must_use]
pub fn format_message(
    kind: AlertKind,
    name: &str,
    hosts: &[String],
    clock: i64,
    offset: TimeDelta,
    zone: DisplayZone,
) -> String {
    let hosts = if hosts.is_empty() {
        crate::types::UNKNOWN_HOST.to_string()
    } else {
        hosts.join(", ")
    };
    format!(
        "{}Problema: {name}\nHosts: {hosts}\nFecha: {}\n",
        kind.marker(),
        fmt_epoch(clock, offset, zone)
    )
}
