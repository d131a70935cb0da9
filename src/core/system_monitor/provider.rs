//! Capabilities the sampling engine reads the host through.

use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, SocketAddr};

use crate::error::Result;

/// Static CPU description
#[derive(Debug, Clone, Default)]
pub struct CpuStatic {
    pub model_name: String,
    pub mhz: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub used_percent: f64,
}

/// Cumulative disk I/O counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiskIoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Cumulative network I/O counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetIoCounters {
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HostIdentity {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub boot_time: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SensorReading {
    pub label: String,
    pub celsius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

/// Socket state as reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnStatus {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    /// Connectionless sockets
    None,
}

impl ConnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnStatus::Established => "ESTABLISHED",
            ConnStatus::SynSent => "SYN_SENT",
            ConnStatus::SynRecv => "SYN_RECV",
            ConnStatus::FinWait1 => "FIN_WAIT1",
            ConnStatus::FinWait2 => "FIN_WAIT2",
            ConnStatus::TimeWait => "TIME_WAIT",
            ConnStatus::Close => "CLOSE",
            ConnStatus::CloseWait => "CLOSE_WAIT",
            ConnStatus::LastAck => "LAST_ACK",
            ConnStatus::Listen => "LISTEN",
            ConnStatus::Closing => "CLOSING",
            ConnStatus::None => "NONE",
        }
    }
}

/// One active inet socket
#[derive(Debug, Clone)]
pub struct InetConnection {
    pub protocol: Protocol,
    pub status: ConnStatus,
    pub local: SocketAddr,
    /// `None` when the socket has no peer
    pub remote: Option<SocketAddr>,
    /// `None` or 0 when the owner is unknown
    pub pid: Option<u32>,
}

/// Trait for host statistics providers.
///
/// Every call may fail independently; callers substitute empty values and
/// carry on. Implementations live in the platform layer.
pub trait SystemStatsProvider: Send {
    /// Refresh cached readings before a sampling cycle
    fn refresh(&mut self) {}

    /// Aggregate usage and per-core usage, percent
    fn cpu_percent(&mut self) -> Result<(f64, Vec<f64>)>;

    fn cpu_info(&mut self) -> Result<CpuStatic>;

    fn load_average(&mut self) -> Result<LoadAverage>;

    fn virtual_memory(&mut self) -> Result<VirtualMemory>;

    fn swap_memory(&mut self) -> Result<SwapMemory>;

    fn disk_partitions(&mut self) -> Result<Vec<Partition>>;

    fn disk_usage(&mut self, path: &str) -> Result<DiskUsage>;

    /// Cumulative counters keyed by device name
    fn disk_io_counters(&mut self) -> Result<HashMap<String, DiskIoCounters>>;

    /// Cumulative counters keyed by interface name
    fn net_io_counters(&mut self) -> Result<HashMap<String, NetIoCounters>>;

    fn host_info(&mut self) -> Result<HostIdentity>;

    fn sensor_temperatures(&mut self) -> Result<Vec<SensorReading>>;

    fn connections(&mut self) -> Result<Vec<InetConnection>>;

    fn process_name(&mut self, pid: u32) -> Result<String>;
}

/// Geo record for one address; names keyed by locale
#[derive(Debug, Clone, Default)]
pub struct GeoRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub country_names: BTreeMap<String, String>,
    pub city_names: BTreeMap<String, String>,
}

impl GeoRecord {
    /// Name in `preferred`, else English
    pub fn country(&self, preferred: &str) -> Option<&str> {
        localized(&self.country_names, preferred)
    }

    pub fn city(&self, preferred: &str) -> Option<&str> {
        localized(&self.city_names, preferred)
    }
}

fn localized<'a>(names: &'a BTreeMap<String, String>, preferred: &str) -> Option<&'a str> {
    names
        .get(preferred)
        .or_else(|| names.get("en"))
        .map(String::as_str)
}

/// Optional geo-location capability
pub trait GeoLookup: Send + Sync {
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord>;
}
