// Platform-specific code module

pub mod geoip;
pub mod interfaces;
pub mod probe;
pub mod proc_net;
pub mod sysinfo_stats;

// Re-exports for clean imports
pub use geoip::MaxMindGeo;
pub use interfaces::IfAddrsSource;
pub use probe::SystemProbe;
pub use sysinfo_stats::SysinfoStats;

use std::sync::Arc;

use crate::core::config::MonitorConfig;
use crate::core::system_monitor::GeoLookup;

/// Geo lookup for the configured database, if any.
///
/// A database that cannot be opened disables geo enrichment instead of
/// failing startup.
pub fn get_geo_provider(config: &MonitorConfig) -> Option<Arc<dyn GeoLookup>> {
    let path = config.geoip_db_path.as_ref()?;
    match MaxMindGeo::open(path) {
        Ok(geo) => Some(Arc::new(geo)),
        Err(e) => {
            log::warn!("GeoIP disabled: {}", e);
            None
        }
    }
}
