// Core business logic module

pub mod config;
pub mod lan;
pub mod system_monitor;

// Re-export commonly used items
pub use config::{LanConfig, MonitorConfig, NetLogPolicy};
pub use lan::{LanDiscovery, ScanResult};
pub use system_monitor::{MonitorState, SamplingLoop, Snapshot};
