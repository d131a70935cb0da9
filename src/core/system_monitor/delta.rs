//! Per-second rates from cumulative I/O counters.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use super::metrics::NetworkInfo;
use super::provider::{DiskIoCounters, NetIoCounters};

/// Previous cumulative counters and the time they were taken
#[derive(Debug, Clone)]
pub struct CounterDeltaTracker {
    last_disk: HashMap<String, DiskIoCounters>,
    last_net: HashMap<String, NetIoCounters>,
    last_time: DateTime<Local>,
}

/// Aggregated network rates for one cycle
#[derive(Debug, Clone, Default)]
pub struct NetworkRates {
    /// Only interfaces that had a previous sample, sorted by name
    pub interfaces: Vec<NetworkInfo>,
    pub total_rx: f64,
    pub total_tx: f64,
}

impl CounterDeltaTracker {
    pub fn new(
        disk: HashMap<String, DiskIoCounters>,
        net: HashMap<String, NetIoCounters>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            last_disk: disk,
            last_net: net,
            last_time: now,
        }
    }

    /// Seconds since the stored sample; non-positive gaps count as one second
    pub fn elapsed_secs(&self, now: DateTime<Local>) -> f64 {
        let elapsed = (now - self.last_time).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0;
        if elapsed <= 0.0 {
            1.0
        } else {
            elapsed
        }
    }

    /// Read/write KB/s for one device; zero when either sample is missing
    pub fn disk_rate(
        &self,
        device: &str,
        current: &HashMap<String, DiskIoCounters>,
        elapsed: f64,
    ) -> (f64, f64) {
        match (self.last_disk.get(device), current.get(device)) {
            (Some(old), Some(cur)) => (
                kb_per_sec(cur.read_bytes, old.read_bytes, elapsed),
                kb_per_sec(cur.write_bytes, old.write_bytes, elapsed),
            ),
            _ => (0.0, 0.0),
        }
    }

    /// Rates for every interface with a previous sample
    pub fn network_rates(
        &self,
        current: &HashMap<String, NetIoCounters>,
        elapsed: f64,
    ) -> NetworkRates {
        let mut rates = NetworkRates::default();

        for (name, cur) in current {
            let Some(old) = self.last_net.get(name) else {
                continue;
            };
            let rx = kb_per_sec(cur.bytes_recv, old.bytes_recv, elapsed);
            let tx = kb_per_sec(cur.bytes_sent, old.bytes_sent, elapsed);
            rates.total_rx += rx;
            rates.total_tx += tx;
            rates.interfaces.push(NetworkInfo {
                interface: name.clone(),
                rx,
                tx,
            });
        }

        rates
            .interfaces
            .sort_by(|a, b| a.interface.cmp(&b.interface));
        rates
    }

    /// Replace the stored sample
    pub fn advance(
        &mut self,
        disk: HashMap<String, DiskIoCounters>,
        net: HashMap<String, NetIoCounters>,
        now: DateTime<Local>,
    ) {
        self.last_disk = disk;
        self.last_net = net;
        self.last_time = now;
    }
}

fn kb_per_sec(current: u64, previous: u64, elapsed: f64) -> f64 {
    // A counter reset reads as zero traffic rather than a negative rate
    current.saturating_sub(previous) as f64 / 1024.0 / elapsed
}
