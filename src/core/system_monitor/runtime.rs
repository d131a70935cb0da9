//! Periodic driver for the sampling loop.
//!
//! One task owns the [`SamplingLoop`] and runs each cycle on the blocking
//! pool, awaiting it before the next tick so cycles never overlap. Ticks that
//! fall behind are skipped rather than replayed. A cycle that panics is
//! logged and sampling resumes on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::collector::SamplingLoop;
use super::metrics::{AlertPage, Snapshot};
use super::state::MonitorState;

/// Handle to a running sampler task.
///
/// Must be created inside a Tokio runtime.
pub struct MetricsRuntime {
    /// Receiver for published snapshots
    pub snapshot_rx: watch::Receiver<Arc<Snapshot>>,

    state: Arc<MonitorState>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    task: JoinHandle<()>,
}

impl MetricsRuntime {
    /// Spawn the sampler; the first cycle runs immediately
    pub fn spawn(sampler: SamplingLoop, period: Duration) -> Self {
        let state = sampler.state();
        let snapshot_rx = state.subscribe();
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

        let task = tokio::spawn(sampler_task(sampler, period, shutdown_rx));
        log::info!("Sampler started ({} ms period)", period.as_millis());

        Self {
            snapshot_rx,
            state,
            shutdown_tx,
            task,
        }
    }

    pub fn state(&self) -> &Arc<MonitorState> {
        &self.state
    }

    pub fn latest_snapshot(&self) -> Arc<Snapshot> {
        self.state.latest_snapshot()
    }

    pub fn alerts(&self, limit: i64, offset: i64) -> AlertPage {
        self.state.alerts(limit, offset)
    }

    /// Stop after the cycle in progress, if any, and wait for the task
    pub async fn shutdown(self) {
        // No receiver means the task already ended
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            log::error!("Sampler task ended abnormally: {}", e);
        }
        log::info!("Sampler stopped");
    }
}

async fn sampler_task(
    sampler: SamplingLoop,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    // The lock is released on unwind, so a panicking cycle leaves the
    // sampler usable for the next tick
    let sampler = Arc::new(Mutex::new(sampler));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Local::now();
                let sampler = sampler.clone();
                let cycle = tokio::task::spawn_blocking(move || {
                    sampler.lock().run_cycle(now);
                });
                if let Err(e) = cycle.await {
                    log::error!("Sampling cycle failed, retrying next tick: {}", e);
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Sampler received shutdown");
                break;
            }
        }
    }
}
