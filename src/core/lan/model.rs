use serde::{Deserialize, Serialize};

/// One reachable LAN peer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub ip: String,
    /// Reverse-resolved name; empty when resolution failed
    pub hostname: String,
    /// Coarse round trip, e.g. `"2.4ms"`
    pub latency: String,
    /// The monitor port accepted a TCP connection
    pub has_monitor: bool,
}

/// One scan of the local segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub local_ip: String,
    /// CIDR, e.g. `"192.168.1.0/24"`
    pub subnet: String,
    pub hosts: Vec<Host>,
}
