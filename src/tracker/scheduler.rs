use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to a repeating task running on the tokio runtime.
///
/// The first tick fires one `period` after spawning. Dropping the handle
/// cancels the task.
pub struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    period: Duration,
}

impl ScheduledTask {
    /// Run `tick` every `period` on the current tokio runtime
    pub fn every<F>(period: Duration, mut tick: F) -> anyhow::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            anyhow::bail!("Scheduled task period must be greater than zero");
        }
        let runtime = Handle::try_current().context("Scheduled tasks need a running tokio runtime")?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                tick();
            }
        });

        debug!("Scheduled task started with period {:?}", period);

        Ok(Self {
            cancelled,
            handle,
            period,
        })
    }

    /// Stop the task; no tick starts after this returns
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.handle.abort();
            debug!("Scheduled task cancelled");
        }
    }

    /// True until cancelled or the task ended
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
