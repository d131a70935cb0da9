use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::system_monitor::history::{ALERT_HISTORY_SIZE, NET_LOG_SIZE};
use crate::core::system_monitor::AlertThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub sample_interval_ms: u64,
    pub alerts: AlertThresholds,
    /// MaxMind City database; geo enrichment is off when unset
    pub geoip_db_path: Option<PathBuf>,
    /// Locale preferred for country/city names (falls back to English)
    pub geo_locale: String,
    /// Attach a connection audit to each net-log entry
    pub audit_connections: bool,
    pub net_log: NetLogPolicy,
    pub alert_history_size: usize,
    /// Prefix for disk usage paths when the host filesystem is mounted elsewhere
    pub host_root: Option<PathBuf>,
    pub hostname_override: Option<String>,
    pub os_override: Option<String>,
    pub lan: LanConfig,
}

/// When a net-log entry is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetLogPolicy {
    /// Aggregate rx+tx above this (KB/s) always logs
    pub threshold_kbps: f64,
    /// Cycles without an entry before a heartbeat entry is forced
    pub heartbeat_cycles: u32,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanConfig {
    /// TCP port that marks a peer as running the monitor
    pub monitor_port: u16,
    /// CIDR to scan instead of the local interface's segment
    pub subnet: Option<String>,
    pub cache_ttl_secs: u64,
    pub max_concurrency: usize,
    pub max_candidates: usize,
    pub ping_timeout_ms: u64,
    pub port_timeout_ms: u64,
    pub dns_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            alerts: AlertThresholds::default(),
            geoip_db_path: None,
            geo_locale: "zh-CN".to_string(),
            audit_connections: true,
            net_log: NetLogPolicy::default(),
            alert_history_size: ALERT_HISTORY_SIZE,
            host_root: None,
            hostname_override: None,
            os_override: None,
            lan: LanConfig::default(),
        }
    }
}

impl Default for NetLogPolicy {
    fn default() -> Self {
        Self {
            threshold_kbps: 100.0,
            heartbeat_cycles: 10,
            capacity: NET_LOG_SIZE,
        }
    }
}

impl Default for LanConfig {
    fn default() -> Self {
        Self {
            monitor_port: 8041,
            subnet: None,
            cache_ttl_secs: 60,
            max_concurrency: 50,
            max_candidates: 255,
            ping_timeout_ms: 1000,
            port_timeout_ms: 200,
            dns_timeout_ms: 1000,
        }
    }
}

impl LanConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }
}

impl MonitorConfig {
    /// Fixed 80/90 thresholds, no geo, traffic-only net log
    pub fn minimal() -> Self {
        Self {
            alerts: AlertThresholds::default(),
            geoip_db_path: None,
            audit_connections: false,
            ..Default::default()
        }
    }

    /// Connection audit on; geo enrichment once a database path is supplied
    pub fn extended() -> Self {
        Self {
            audit_connections: true,
            ..Default::default()
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn geo_enabled(&self) -> bool {
        self.geoip_db_path.is_some()
    }

    /// Defaults, then the user config file if present, then the environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::get_config_path() {
            Ok(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Read a JSON config file; missing keys keep their defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, data).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("hostwatch").join("config.json"))
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`; unparsable numbers are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let float = |key: &str| non_empty(key).and_then(|v| v.trim().parse::<f64>().ok());

        if let Some(v) = float("ALERT_CPU_WARN") {
            self.alerts.cpu_warn = v;
        }
        if let Some(v) = float("ALERT_MEM_WARN") {
            self.alerts.mem_warn = v;
        }
        if let Some(v) = float("ALERT_CPU_CRITICAL") {
            self.alerts.cpu_critical = Some(v);
        }
        if let Some(v) = float("ALERT_MEM_CRITICAL") {
            self.alerts.mem_critical = Some(v);
        }
        if let Some(v) = non_empty("GEOIP_DB_PATH") {
            self.geoip_db_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty("HOST_ROOT") {
            self.host_root = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty("HOST_HOSTNAME") {
            self.hostname_override = Some(v);
        }
        if let Some(v) = non_empty("HOST_OS") {
            self.os_override = Some(v);
        }
    }
}
