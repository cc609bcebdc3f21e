//! Periodic save timer owned by the session
//!
//! Starting an already running timer is a no-op, so there are never two
//! competing intervals. Stopping aborts the task; the synchronizer releases
//! its in-flight flag if a save was interrupted.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct Autosave {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Autosave {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Run `tick` every period until stopped or until `tick` returns false
    ///
    /// Returns false if the timer was already running. Must be called from
    /// within a tokio runtime.
    pub fn start<F, Fut>(&mut self, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        if self.is_running() {
            tracing::debug!("autosave already running");
            return false;
        }

        let period = self.period;
        // Measured from the call, not from the task's first poll
        let first = Instant::now() + period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            // A slow save should not cause a burst of catch-up ticks
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !tick().await {
                    tracing::debug!("autosave target gone, stopping");
                    break;
                }
            }
        }));

        tracing::debug!(period_secs = period.as_secs(), "autosave started");
        true
    }

    /// Returns false if nothing was running
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                tracing::debug!("autosave stopped");
                was_running
            }
            None => false,
        }
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL)
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
