//! Fake capability providers shared by the integration tests.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hostwatch::core::lan::{LocalAddressSource, LocalInterface, Reachability};
use hostwatch::core::system_monitor::provider::*;
use hostwatch::error::{HostwatchError, Result};
use parking_lot::Mutex;

/// Readings a test can change between cycles
#[derive(Debug, Clone, Default)]
pub struct FakeReadings {
    pub cpu: f64,
    pub mem_percent: f64,
    pub disk_io: HashMap<String, DiskIoCounters>,
    pub net_io: HashMap<String, NetIoCounters>,
    pub partitions: Vec<Partition>,
    pub connections: Vec<InetConnection>,
    pub hostname: String,
    /// Every call fails
    pub broken: bool,
    /// The next CPU reading panics, as a crashing driver would
    pub panic_next: bool,
}

impl FakeReadings {
    pub fn healthy() -> Self {
        Self {
            cpu: 12.5,
            mem_percent: 40.0,
            disk_io: [("sda1".to_string(), DiskIoCounters::default())].into_iter().collect(),
            net_io: [("eth0".to_string(), NetIoCounters::default())].into_iter().collect(),
            partitions: vec![
                Partition {
                    device: "sda1".into(),
                    mountpoint: "/".into(),
                    fstype: "ext4".into(),
                },
                Partition {
                    device: "tmpfs".into(),
                    mountpoint: "/dev/shm".into(),
                    fstype: "tmpfs".into(),
                },
            ],
            connections: Vec::new(),
            hostname: "testbox".into(),
            broken: false,
            panic_next: false,
        }
    }

    pub fn add_traffic(&mut self, interface: &str, recv: u64, sent: u64) {
        let counters = self.net_io.entry(interface.to_string()).or_default();
        counters.bytes_recv += recv;
        counters.bytes_sent += sent;
    }
}

/// Stats provider reading from a shared [`FakeReadings`]
#[derive(Clone)]
pub struct FakeStats {
    pub readings: Arc<Mutex<FakeReadings>>,
    pub process_lookups: Arc<AtomicUsize>,
}

impl FakeStats {
    pub fn new(readings: FakeReadings) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings)),
            process_lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&FakeReadings) -> T) -> Result<T> {
        let readings = self.readings.lock();
        if readings.broken {
            return Err(HostwatchError::metric_collection("fake failure"));
        }
        Ok(f(&readings))
    }
}

impl SystemStatsProvider for FakeStats {
    fn cpu_percent(&mut self) -> Result<(f64, Vec<f64>)> {
        let crash = std::mem::take(&mut self.readings.lock().panic_next);
        if crash {
            panic!("CPU reading crashed");
        }
        self.read(|r| (r.cpu, vec![r.cpu, r.cpu]))
    }

    fn cpu_info(&mut self) -> Result<CpuStatic> {
        self.read(|_| CpuStatic {
            model_name: "Fake CPU".into(),
            mhz: 2400.0,
        })
    }

    fn load_average(&mut self) -> Result<LoadAverage> {
        self.read(|_| LoadAverage {
            one: 0.5,
            five: 0.4,
            fifteen: 0.3,
        })
    }

    fn virtual_memory(&mut self) -> Result<VirtualMemory> {
        self.read(|r| VirtualMemory {
            total: 16 << 30,
            used: ((16u64 << 30) as f64 * r.mem_percent / 100.0) as u64,
            free: 1 << 30,
            used_percent: r.mem_percent,
        })
    }

    fn swap_memory(&mut self) -> Result<SwapMemory> {
        self.read(|_| SwapMemory {
            total: 2 << 30,
            used: 0,
        })
    }

    fn disk_partitions(&mut self) -> Result<Vec<Partition>> {
        self.read(|r| r.partitions.clone())
    }

    fn disk_usage(&mut self, _path: &str) -> Result<DiskUsage> {
        self.read(|_| DiskUsage {
            total: 100 << 30,
            used: 25 << 30,
            used_percent: 25.0,
        })
    }

    fn disk_io_counters(&mut self) -> Result<HashMap<String, DiskIoCounters>> {
        self.read(|r| r.disk_io.clone())
    }

    fn net_io_counters(&mut self) -> Result<HashMap<String, NetIoCounters>> {
        self.read(|r| r.net_io.clone())
    }

    fn host_info(&mut self) -> Result<HostIdentity> {
        self.read(|r| HostIdentity {
            hostname: r.hostname.clone(),
            os: "linux".into(),
            platform: "debian".into(),
            boot_time: 1_700_000_000,
        })
    }

    fn sensor_temperatures(&mut self) -> Result<Vec<SensorReading>> {
        self.read(|_| {
            vec![SensorReading {
                label: "Package id 0".into(),
                celsius: 48.0,
            }]
        })
    }

    fn connections(&mut self) -> Result<Vec<InetConnection>> {
        self.read(|r| r.connections.clone())
    }

    fn process_name(&mut self, pid: u32) -> Result<String> {
        self.process_lookups.fetch_add(1, Ordering::SeqCst);
        self.read(|_| format!("proc-{}", pid))
    }
}

/// Geo database knowing only 8.8.8.8 and 8.8.4.4, both at one coordinate
pub struct FakeGeo;

impl GeoLookup for FakeGeo {
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        match ip.to_string().as_str() {
            "8.8.8.8" | "8.8.4.4" => {
                let mut record = GeoRecord {
                    latitude: 37.751,
                    longitude: -97.822,
                    ..Default::default()
                };
                record.country_names.insert("en".into(), "United States".into());
                record.country_names.insert("zh-CN".into(), "美国".into());
                Ok(record)
            }
            _ => Err(HostwatchError::geo_lookup("not in database")),
        }
    }
}

pub fn tcp(local: &str, remote: &str, status: ConnStatus, pid: Option<u32>) -> InetConnection {
    InetConnection {
        protocol: Protocol::Tcp,
        status,
        local: local.parse().unwrap(),
        remote: Some(remote.parse().unwrap()),
        pid,
    }
}

/// Counters a [`FakeProber`] shares with the test that built it
#[derive(Debug, Default)]
pub struct ProbeStats {
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub pings: AtomicUsize,
}

/// Prober answering for a fixed set of last octets, counting concurrency
pub struct FakeProber {
    pub alive: Vec<u8>,
    pub delay: Duration,
    pub stats: Arc<ProbeStats>,
}

impl FakeProber {
    pub fn new(alive: Vec<u8>, delay: Duration) -> Self {
        Self {
            alive,
            delay,
            stats: Arc::new(ProbeStats::default()),
        }
    }
}

impl Reachability for FakeProber {
    async fn ping(&self, ip: Ipv4Addr, _timeout: Duration) -> Option<Duration> {
        let stats = &self.stats;
        stats.pings.fetch_add(1, Ordering::SeqCst);
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        stats.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.alive
            .contains(&ip.octets()[3])
            .then_some(Duration::from_millis(3))
    }

    async fn port_open(&self, _ip: Ipv4Addr, port: u16, _timeout: Duration) -> bool {
        port == 8041
    }

    async fn reverse_lookup(&self, ip: Ipv4Addr, _timeout: Duration) -> Option<String> {
        Some(format!("host-{}.lan.", ip.octets()[3]))
    }
}

pub struct FixedSource(pub Option<LocalInterface>);

impl FixedSource {
    pub fn at(ip: [u8; 4], prefix: u8) -> Self {
        Self(Some(LocalInterface {
            ip: Ipv4Addr::from(ip),
            prefix,
        }))
    }
}

impl LocalAddressSource for FixedSource {
    fn local_ipv4(&self) -> Result<LocalInterface> {
        self.0.ok_or(HostwatchError::NoSubnet)
    }
}
