//! Periodic re-hashing of every tracked file.

use crate::registry::{Registry, ScanReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Spawns the scan loop for a [`Registry`].
///
/// Scans run one at a time on the blocking pool. A tick that comes due
/// while a scan is still running is dropped rather than queued.
pub struct Monitor;

impl Monitor {
    /// Start scanning `registry` every `interval` on the current tokio runtime.
    ///
    /// The first scan happens one interval after spawning. A zero interval
    /// is treated as one millisecond.
    pub fn spawn(registry: Arc<Registry>, interval: Duration) -> MonitorHandle {
        Self::spawn_scan(interval, move || registry.check_for_changes())
    }

    fn spawn_scan<F>(interval: Duration, scan: F) -> MonitorHandle
    where
        F: Fn() -> ScanReport + Send + Sync + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let scan = Arc::new(scan);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut timer = tokio::time::interval_at(start, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(?interval, "monitor started");

            loop {
                tokio::select! {
                    _ = timer.tick() => {}
                    _ = stop_rx.changed() => break,
                }

                let scan = Arc::clone(&scan);
                match tokio::task::spawn_blocking(move || scan()).await {
                    Ok(report) => debug!(
                        checked = report.checked,
                        drifted = report.drifted,
                        failed = report.failed,
                        "scan complete"
                    ),
                    Err(err) => warn!(error = %err, "scan task failed"),
                }

                if *stop_rx.borrow() {
                    break;
                }
            }
            info!("monitor stopped");
        });

        MonitorHandle {
            stop: stop_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running monitor loop. Dropping it aborts the loop.
pub struct MonitorHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Ask the loop to exit and wait for it. A scan already in progress
    /// is allowed to finish.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "monitor task ended abnormally");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
