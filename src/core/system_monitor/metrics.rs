//! Snapshot data model published by the sampler.

use serde::{Deserialize, Serialize};

/// One published point-in-time view of host state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disk: Vec<DiskInfo>,
    pub network: Vec<NetworkInfo>,
    pub system: SystemInfo,
    pub perf: PerfInfo,
    /// Full alert history (bounded)
    pub alerts: Vec<AlertRecord>,
    /// Alerts raised by the cycle that produced this snapshot
    #[serde(rename = "current_alerts")]
    pub current: Vec<AlertRecord>,
    pub net_log: Vec<NetLogEntry>,
    pub geo_heat: Vec<GeoPoint>,
    pub timestamp: i64, // Unix timestamp
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuInfo {
    pub usage: f64,
    pub per_core: Vec<f64>,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub cores: usize,
    pub model_name: String,
    pub mhz: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
    pub swap_used: u64,
    pub swap_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub path: String,
    pub total: u64,
    pub used: u64,
    pub used_percent: f64,
    pub read_speed: f64,  // KB/s
    pub write_speed: f64, // KB/s
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub interface: String,
    pub rx: f64, // KB/s
    pub tx: f64, // KB/s
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub boot_time: u64,
}

/// Derived performance summary for one cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerfInfo {
    pub cpu_usage: f64,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub mem_used_percent: f64,
    pub swap_used: u64,
    pub swap_total: u64,
    pub net_rx_kbps: f64,
    pub net_tx_kbps: f64,
    pub disk_read_kbps: f64,
    pub disk_write_kbps: f64,
    /// 0 when the platform exposes no CPU sensor
    pub cpu_temp: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Warn,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Warn => "warn",
            AlertLevel::Critical => "critical",
        }
    }
}

/// One threshold breach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub level: AlertLevel,
    pub text: String,
    /// Local time of day, HH:MM:SS
    pub time: String,
}

/// One recorded traffic sample
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetLogEntry {
    pub time: String,
    pub rx: f64,
    pub tx: f64,
    pub interfaces: Vec<NetworkInfo>,
    pub connections: Vec<ConnectionAudit>,
}

/// One externally-facing active connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAudit {
    pub remote_ip: String,
    pub remote_port: u16,
    pub local_port: u16,
    pub protocol: String,
    pub status: String,
    pub process: String,
    pub country: String,
    pub city: String,
}

/// Remote endpoints sharing one coordinate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub count: u32,
    pub country: String,
    pub city: String,
}

/// One page of the alert history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertPage {
    pub items: Vec<AlertRecord>,
    pub total: usize,
}
