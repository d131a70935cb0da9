//! Published monitor state shared between the sampler and readers.
//!
//! The latest snapshot, the alert history and the net log sit behind one
//! read-many/write-one lock. The writer holds it exclusively only to append
//! and to swap the snapshot; history copies are taken under a shared lock.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use tokio::sync::watch;

use super::history::BoundedHistory;
use super::metrics::{AlertPage, AlertRecord, NetLogEntry, Snapshot};

pub const DEFAULT_ALERT_PAGE: usize = 20;

pub struct MonitorState {
    inner: RwLock<Published>,
    updates: watch::Sender<Arc<Snapshot>>,
}

struct Published {
    latest: Arc<Snapshot>,
    alerts: BoundedHistory<AlertRecord>,
    net_log: BoundedHistory<NetLogEntry>,
}

impl MonitorState {
    pub fn new(alert_capacity: usize, net_log_capacity: usize) -> Self {
        let latest = Arc::new(Snapshot::default());
        let (updates, _) = watch::channel(latest.clone());
        Self {
            inner: RwLock::new(Published {
                latest,
                alerts: BoundedHistory::with_capacity(alert_capacity),
                net_log: BoundedHistory::with_capacity(net_log_capacity),
            }),
            updates,
        }
    }

    /// Most recent snapshot; default-valued before the first cycle
    pub fn latest_snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().latest.clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.updates.subscribe()
    }

    /// One page of alert history, oldest first.
    ///
    /// A non-positive `limit` means [`DEFAULT_ALERT_PAGE`]; `offset` is
    /// clamped into `[0, total]`.
    pub fn alerts(&self, limit: i64, offset: i64) -> AlertPage {
        let published = self.inner.read();
        let total = published.alerts.len();

        let limit = if limit <= 0 {
            DEFAULT_ALERT_PAGE
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        };
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX).min(total);

        AlertPage {
            items: published.alerts.slice(offset, limit),
            total,
        }
    }

    /// Append this cycle's records and swap in the new snapshot.
    ///
    /// `snapshot.alerts` and `snapshot.net_log` are filled from the histories
    /// after the append. Called by one writer at a time (the sampling loop).
    pub(crate) fn publish(
        &self,
        mut snapshot: Snapshot,
        net_log_entry: Option<NetLogEntry>,
    ) -> Arc<Snapshot> {
        let (alerts, net_log) = {
            let mut published = self.inner.write();
            published.alerts.append(snapshot.current.iter().cloned());
            if let Some(entry) = net_log_entry {
                published.net_log.append([entry]);
            }

            let published = RwLockWriteGuard::downgrade(published);
            (published.alerts.snapshot(), published.net_log.snapshot())
        };
        snapshot.alerts = alerts;
        snapshot.net_log = net_log;

        let latest = Arc::new(snapshot);
        self.inner.write().latest = latest.clone();

        self.updates.send_replace(latest.clone());
        latest
    }
}

/// Lenient `limit`/`offset` parsing: anything unparsable becomes 0
pub fn parse_page_params(limit: Option<&str>, offset: Option<&str>) -> (i64, i64) {
    let parse = |value: Option<&str>| {
        value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    };
    (parse(limit), parse(offset))
}
