//! One sampling cycle: read the provider, derive rates and alerts, publish.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::core::config::MonitorConfig;
use crate::error::Result;

use super::alerts::evaluate_alerts;
use super::audit::audit_connections;
use super::delta::CounterDeltaTracker;
use super::geo::aggregate_geo;
use super::metrics::*;
use super::provider::{
    DiskIoCounters, GeoLookup, InetConnection, Partition, SensorReading, SystemStatsProvider,
};
use super::state::MonitorState;

const UNKNOWN_CPU: &str = "Unknown CPU";

/// Mount prefixes that never hold user data
const IGNORED_MOUNT_PREFIXES: &[&str] = &["/proc", "/sys", "/dev", "/run", "/boot", "/snap"];
const IGNORED_MOUNT_FRAGMENTS: &[&str] = &["/docker", "/kubelet"];
const IGNORED_FILESYSTEMS: &[&str] = &["tmpfs", "overlay", "squashfs", "autofs", "devtmpfs"];

/// Drives one sampling cycle at a time and publishes into a [`MonitorState`].
///
/// Owns the delta tracker, so cycles are sequential by construction.
pub struct SamplingLoop {
    provider: Box<dyn SystemStatsProvider>,
    geo: Option<Arc<dyn GeoLookup>>,
    config: MonitorConfig,
    tracker: CounterDeltaTracker,
    cycles_since_log: u32,
    state: Arc<MonitorState>,
}

/// CPU and memory readings of one cycle
struct CpuMemory {
    cpu: CpuInfo,
    memory: MemoryInfo,
    swap_used: u64,
    swap_total: u64,
}

struct DiskSample {
    rows: Vec<DiskInfo>,
    total_read: f64,
    total_write: f64,
}

impl SamplingLoop {
    /// Build the engine and take the baseline counter sample.
    ///
    /// Devices and interfaces present now are rated from the first cycle on.
    /// A disk that appears later reports zero rates for its first cycle; an
    /// interface that appears later is left out of that cycle.
    pub fn new(
        mut provider: Box<dyn SystemStatsProvider>,
        geo: Option<Arc<dyn GeoLookup>>,
        config: MonitorConfig,
        now: DateTime<Local>,
    ) -> Self {
        provider.refresh();
        let disk_io = degraded("disk I/O counters", provider.disk_io_counters());
        let net_io = degraded("network counters", provider.net_io_counters());

        let state = Arc::new(MonitorState::new(
            config.alert_history_size,
            config.net_log.capacity,
        ));

        Self {
            provider,
            geo,
            config,
            tracker: CounterDeltaTracker::new(disk_io, net_io, now),
            cycles_since_log: 0,
            state,
        }
    }

    pub fn state(&self) -> Arc<MonitorState> {
        self.state.clone()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Collect, derive and publish one snapshot.
    ///
    /// Provider failures zero the affected metric; the cycle always publishes.
    pub fn run_cycle(&mut self, now: DateTime<Local>) -> Arc<Snapshot> {
        self.provider.refresh();
        let elapsed = self.tracker.elapsed_secs(now);

        let cpu_memory = self.collect_cpu_memory();

        let disk_io = degraded("disk I/O counters", self.provider.disk_io_counters());
        let disks = self.collect_disks(&disk_io, elapsed);

        let net_io = degraded("network counters", self.provider.net_io_counters());
        let rates = self.tracker.network_rates(&net_io, elapsed);

        let system = self.collect_system();
        let cpu_temp = cpu_temperature(&degraded(
            "sensor temperatures",
            self.provider.sensor_temperatures(),
        ));

        let perf = PerfInfo {
            cpu_usage: cpu_memory.cpu.usage,
            load1: cpu_memory.cpu.load1,
            load5: cpu_memory.cpu.load5,
            load15: cpu_memory.cpu.load15,
            mem_used_percent: cpu_memory.memory.used_percent,
            swap_used: cpu_memory.swap_used,
            swap_total: cpu_memory.swap_total,
            net_rx_kbps: rates.total_rx,
            net_tx_kbps: rates.total_tx,
            disk_read_kbps: disks.total_read,
            disk_write_kbps: disks.total_write,
            cpu_temp,
        };

        let current = evaluate_alerts(
            perf.cpu_usage,
            perf.mem_used_percent,
            &self.config.alerts,
            &now,
        );

        let should_log = self.should_log(rates.total_rx + rates.total_tx);
        let wants_audit = should_log && self.config.audit_connections;
        let connections = if wants_audit || self.geo.is_some() {
            degraded("connections", self.provider.connections())
        } else {
            Vec::new()
        };

        let net_log_entry = should_log.then(|| NetLogEntry {
            time: now.format("%H:%M:%S").to_string(),
            rx: rates.total_rx,
            tx: rates.total_tx,
            interfaces: rates.interfaces.clone(),
            connections: if wants_audit {
                self.audit(&connections)
            } else {
                Vec::new()
            },
        });

        let geo_heat = match &self.geo {
            Some(geo) => aggregate_geo(&connections, geo.as_ref(), &self.config.geo_locale),
            None => Vec::new(),
        };

        let snapshot = Snapshot {
            cpu: cpu_memory.cpu,
            memory: cpu_memory.memory,
            disk: disks.rows,
            network: rates.interfaces,
            system,
            perf,
            alerts: Vec::new(),
            current,
            net_log: Vec::new(),
            geo_heat,
            timestamp: now.timestamp(),
        };

        let published = self.state.publish(snapshot, net_log_entry);
        self.tracker.advance(disk_io, net_io, now);
        published
    }

    /// Heartbeat counter plus traffic threshold
    fn should_log(&mut self, total_kbps: f64) -> bool {
        self.cycles_since_log += 1;
        let should_log = total_kbps > self.config.net_log.threshold_kbps
            || self.cycles_since_log >= self.config.net_log.heartbeat_cycles;
        if should_log {
            self.cycles_since_log = 0;
        }
        should_log
    }

    fn audit(&mut self, connections: &[InetConnection]) -> Vec<ConnectionAudit> {
        let provider = &mut self.provider;
        audit_connections(
            connections,
            |pid| match provider.process_name(pid) {
                Ok(name) => Some(name),
                Err(e) => {
                    log::debug!("Process name lookup for pid {} failed: {}", pid, e);
                    None
                }
            },
            self.geo.as_deref(),
            &self.config.geo_locale,
        )
    }

    fn collect_cpu_memory(&mut self) -> CpuMemory {
        let (usage, per_core) = degraded("CPU usage", self.provider.cpu_percent());
        let load = degraded("load average", self.provider.load_average());
        let memory = degraded("virtual memory", self.provider.virtual_memory());
        let swap = degraded("swap memory", self.provider.swap_memory());

        let cores = per_core.len();
        let (model_name, mhz) = match self.provider.cpu_info() {
            Ok(info) => (info.model_name, info.mhz),
            Err(e) => {
                log::debug!("CPU info unavailable: {}", e);
                let name = if cores > 0 { UNKNOWN_CPU } else { "" };
                (name.to_string(), 0.0)
            }
        };

        CpuMemory {
            cpu: CpuInfo {
                usage,
                per_core,
                load1: load.one,
                load5: load.five,
                load15: load.fifteen,
                cores,
                model_name,
                mhz,
            },
            memory: MemoryInfo {
                total: memory.total,
                used: memory.used,
                free: memory.free,
                used_percent: memory.used_percent,
                swap_used: swap.used,
                swap_total: swap.total,
            },
            swap_used: swap.used,
            swap_total: swap.total,
        }
    }

    fn collect_disks(
        &mut self,
        disk_io: &HashMap<String, DiskIoCounters>,
        elapsed: f64,
    ) -> DiskSample {
        let partitions = degraded("disk partitions", self.provider.disk_partitions());
        let mut sample = DiskSample {
            rows: Vec::new(),
            total_read: 0.0,
            total_write: 0.0,
        };

        for partition in partitions.iter().filter(|p| !should_ignore_partition(p)) {
            let usage_path = usage_path(self.config.host_root.as_deref(), &partition.mountpoint);
            let usage = match self.provider.disk_usage(&usage_path) {
                Ok(usage) => usage,
                Err(e) => {
                    log::debug!("Skipping {}: {}", partition.mountpoint, e);
                    continue;
                }
            };

            let (read_speed, write_speed) =
                self.tracker
                    .disk_rate(&partition.device, disk_io, elapsed);
            sample.total_read += read_speed;
            sample.total_write += write_speed;
            sample.rows.push(DiskInfo {
                path: partition.mountpoint.clone(),
                total: usage.total,
                used: usage.used,
                used_percent: usage.used_percent,
                read_speed,
                write_speed,
            });
        }

        sample
    }

    fn collect_system(&mut self) -> SystemInfo {
        let host = degraded("host info", self.provider.host_info());
        SystemInfo {
            hostname: self
                .config
                .hostname_override
                .clone()
                .unwrap_or(host.hostname),
            os: self.config.os_override.clone().unwrap_or(host.os),
            platform: host.platform,
            boot_time: host.boot_time,
        }
    }
}

/// Log a provider failure and fall back to the empty value
fn degraded<T: Default>(what: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        log::debug!("{} unavailable: {}", what, e);
        T::default()
    })
}

/// Pseudo, container and boot filesystems carry no user data
pub fn should_ignore_partition(partition: &Partition) -> bool {
    if cfg!(windows) {
        return !is_drive_letter(&partition.device);
    }

    let mount = partition.mountpoint.as_str();
    IGNORED_MOUNT_PREFIXES
        .iter()
        .any(|prefix| mount == *prefix || mount.starts_with(&format!("{}/", prefix)))
        || IGNORED_MOUNT_FRAGMENTS
            .iter()
            .any(|fragment| mount.contains(fragment))
        || IGNORED_FILESYSTEMS.contains(&partition.fstype.as_str())
}

fn is_drive_letter(device: &str) -> bool {
    let bytes = device.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Mountpoint as seen from inside `host_root`, if one is set
fn usage_path(host_root: Option<&Path>, mountpoint: &str) -> String {
    match host_root {
        Some(root) => root
            .join(mountpoint.trim_start_matches('/'))
            .to_string_lossy()
            .into_owned(),
        None => mountpoint.to_string(),
    }
}

/// First sensor labelled as a CPU or package sensor; 0 when none
fn cpu_temperature(sensors: &[SensorReading]) -> f64 {
    sensors
        .iter()
        .find(|s| {
            let label = s.label.to_lowercase();
            label.contains("cpu") || label.contains("package")
        })
        .map(|s| s.celsius)
        .unwrap_or(0.0)
}
