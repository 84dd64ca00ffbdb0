use std::time::Duration;

use futures::{future::BoxFuture, StreamExt};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_stream::wrappers::IntervalStream;

use crate::error::Result;

/// Owns a background re-fetch loop. Dropping the handle aborts the loop together with any
/// fetch still in flight.
pub struct PollHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Runs `tick` every `period`, starting one period from now; the view does its own
    /// initial load. Failures are logged and retried on the next tick.
    pub fn spawn<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> BoxFuture<'static, Result<()>> + Send + 'static,
    {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        let task = tokio::spawn(async move {
            while ticks.next().await.is_some() {
                if let Err(e) = tick().await {
                    tracing::warn!(poll = name, "Poll failed: {}", e);
                }
            }
        });

        tracing::debug!(poll = name, ?period, "Polling started");
        Self { name, task }
    }

    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(poll = self.name, "Polling stopped");
    }
}
