//! LAN discovery engine.
//!
//! Finds the local IPv4 segment, probes it with bounded concurrency and keeps
//! the last topology behind a short-lived cache.

mod discovery;
mod model;
pub mod probe;
pub mod scanner;
pub mod subnet;

pub use discovery::LanDiscovery;
pub use model::{Host, ScanResult};
pub use probe::{LocalAddressSource, LocalInterface, Reachability};
pub use scanner::{perform_scan, scan_subnet};
pub use subnet::{candidate_addresses, scan_subnet_for, Ipv4Subnet};
