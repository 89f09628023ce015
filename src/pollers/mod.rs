//! Fixed-interval background refreshers and their lifecycle.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

pub mod business;
pub mod customer;
pub mod shell;

pub use business::{BusinessNotificationPoller, BusinessNotificationState};
pub use customer::{CustomerNotificationPoller, CustomerNotificationState, StatusSnapshot};
pub use shell::NotificationShell;

/// One unit of periodic work. A tick handles its own errors.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn tick(&self);
}

/// A running poll loop.
///
/// The first tick fires immediately. Ticks never overlap: the loop awaits
/// each one before waiting for the next interval.
#[derive(Debug)]
pub struct PollingHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn spawn(task: Arc<dyn PollTask>, period: Duration) -> Self {
        let period = if period.is_zero() {
            Duration::from_secs(1)
        } else {
            period
        };
        let (cancel, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!(
                poller = task.name(),
                interval_secs = period.as_secs(),
                "poller started"
            );
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        task.tick().await;
                    }
                    changed = cancelled.changed() => {
                        if changed.is_err() || *cancelled.borrow() {
                            tracing::info!(poller = task.name(), "poller stopped");
                            break;
                        }
                    }
                }
            }
        });

        Self { cancel, task }
    }

    /// Signal the loop and wait for it to exit. An in-flight tick completes first.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "poller task ended abnormally");
        }
    }
}
