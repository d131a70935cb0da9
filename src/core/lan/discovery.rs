//! Cached, single-flight LAN topology.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::core::config::LanConfig;

use super::model::ScanResult;
use super::probe::{LocalAddressSource, Reachability};
use super::scanner::perform_scan;

/// Serves the last scan and refreshes it in the background.
///
/// At most one scan runs at a time. Cloning shares the same cache.
pub struct LanDiscovery<P: Reachability> {
    shared: Arc<Shared<P>>,
}

struct Shared<P> {
    prober: Arc<P>,
    source: Arc<dyn LocalAddressSource>,
    config: LanConfig,
    cache: Mutex<ScanCache>,
    idle: Notify,
}

struct ScanCache {
    last: Arc<ScanResult>,
    scanned_at: Option<Instant>,
    in_flight: Option<JoinHandle<()>>,
    scans_started: u64,
}

impl ScanCache {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.last.hosts.is_empty()
            && self
                .scanned_at
                .is_some_and(|at| at.elapsed() < ttl)
    }

    fn is_scanning(&self) -> bool {
        // A scan task that panicked leaves a finished handle behind
        self.in_flight
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl<P: Reachability> Clone for LanDiscovery<P> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<P: Reachability> LanDiscovery<P> {
    pub fn new(prober: P, source: Arc<dyn LocalAddressSource>, config: LanConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                prober: Arc::new(prober),
                source,
                config,
                cache: Mutex::new(ScanCache {
                    last: Arc::new(ScanResult::default()),
                    scanned_at: None,
                    in_flight: None,
                    scans_started: 0,
                }),
                idle: Notify::new(),
            }),
        }
    }

    /// Best topology available right now; never waits for a scan.
    ///
    /// A fresh, non-empty result is served from cache. Otherwise a background
    /// scan is started unless one is already running, and the previous
    /// (possibly empty) result is returned. Must be called inside a Tokio
    /// runtime.
    pub fn get_topology(&self) -> Arc<ScanResult> {
        let mut cache = self.shared.cache.lock();

        if cache.is_fresh(self.shared.config.cache_ttl()) || cache.is_scanning() {
            return cache.last.clone();
        }

        let shared = self.shared.clone();
        cache.in_flight = Some(tokio::spawn(shared.run_scan()));
        cache.scans_started += 1;
        log::debug!("LAN scan #{} started", cache.scans_started);

        cache.last.clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.shared.cache.lock().is_scanning()
    }

    /// Scans started since construction
    pub fn scans_started(&self) -> u64 {
        self.shared.cache.lock().scans_started
    }

    /// Wait until no scan is running, then return the cached result
    pub async fn wait_idle(&self) -> Arc<ScanResult> {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let cache = self.shared.cache.lock();
                if !cache.is_scanning() {
                    return cache.last.clone();
                }
            }

            notified.await;
        }
    }

    /// Start a scan if needed and wait for its result
    pub async fn refresh(&self) -> Arc<ScanResult> {
        self.get_topology();
        self.wait_idle().await
    }
}

impl<P: Reachability> Shared<P> {
    async fn run_scan(self: Arc<Self>) {
        let result = perform_scan(self.prober.clone(), self.source.as_ref(), &self.config).await;

        {
            let mut cache = self.cache.lock();
            cache.last = Arc::new(result);
            cache.scanned_at = Some(Instant::now());
            cache.in_flight = None;
        }

        self.idle.notify_waiters();
    }
}
