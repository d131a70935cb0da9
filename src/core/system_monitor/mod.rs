//! Host sampling engine.
//!
//! Counter deltas, alert evaluation, bounded histories and connection/geo
//! enrichment, assembled into one published snapshot per cycle.

pub mod alerts;
pub mod audit;
mod collector;
pub mod delta;
pub mod geo;
pub mod history;
mod metrics;
pub mod provider;
mod runtime;
mod state;

pub use alerts::{evaluate_alerts, AlertThresholds};
pub use collector::{should_ignore_partition, SamplingLoop};
pub use history::BoundedHistory;
pub use metrics::{
    AlertLevel, AlertPage, AlertRecord, ConnectionAudit, CpuInfo, DiskInfo, GeoPoint, MemoryInfo,
    NetLogEntry, NetworkInfo, PerfInfo, Snapshot, SystemInfo,
};
pub use provider::{GeoLookup, GeoRecord, SystemStatsProvider};
pub use runtime::MetricsRuntime;
pub use state::{parse_page_params, MonitorState, DEFAULT_ALERT_PAGE};
