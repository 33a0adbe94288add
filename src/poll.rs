use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info};

use crate::scanner::CycleOutcome;
use crate::types::PollWindow;
use crate::window::{Clock, get_window};
use crate::zbx_client::Session;

/// One unit of work per polling cycle.
#[async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self, session: &Session, window: PollWindow) -> CycleOutcome;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoopStats {
    pub completed: u64,
    pub failed: u64,
}

/// Fixed-rate driver: the next cycle starts `interval` after the previous
/// one started, unless the cycle failed, in which case a full interval is
/// waited after it ended.
pub struct PollLoop<'s, R, C> {
    runner: R,
    clock: C,
    session: &'s Session,
    interval: Duration,
}

impl<'s, R, C> PollLoop<'s, R, C>
where
    R: CycleRunner,
    C: Clock,
{
    pub const fn new(runner: R, clock: C, session: &'s Session, interval: Duration) -> Self {
        Self {
            runner,
            clock,
            session,
            interval,
        }
    }

    /// Runs until the process is stopped. Cycle failures never end the loop.
    pub async fn run(&self) {
        loop {
            let (_, pause) = self.cycle().await;
            self.pause(pause).await;
        }
    }

    /// Runs `cycles` cycles, pausing between them but not after the last.
    pub async fn run_cycles(&self, cycles: u64) -> LoopStats {
        let mut stats = LoopStats::default();
        for n in 1..=cycles {
            let (outcome, pause) = self.cycle().await;
            if outcome.is_failed() {
                stats.failed += 1;
            } else {
                stats.completed += 1;
            }
            if n < cycles {
                self.pause(pause).await;
            }
        }
        stats
    }

    async fn cycle(&self) -> (CycleOutcome, Duration) {
        let started = Instant::now();
        let window = get_window(self.clock.now(), self.interval.as_secs());
        let outcome = self.runner.run_cycle(self.session, window).await;
        let elapsed = started.elapsed();

        let pause = match &outcome {
            CycleOutcome::Completed(report) => {
                info!(
                    %window,
                    resolved = report.resolved,
                    active = report.active,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "check completed"
                );
                self.interval.saturating_sub(elapsed)
            }
            CycleOutcome::Failed(err) => {
                error!(%window, error = %err, "check failed; retrying after full interval");
                self.interval
            }
        };
        (outcome, pause)
    }

    async fn pause(&self, pause: Duration) {
        debug!(
            sleep_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
            "waiting before next check"
        );
        if !pause.is_zero() {
            sleep(pause).await;
        }
    }
}
