// Command handlers module
pub mod alerts;
pub mod config;
pub mod conns;
pub mod scan;
pub mod version;
pub mod watch;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;

use crate::core::config::MonitorConfig;

/// Defaults, then the config file, then the environment, then flags.
///
/// Only flags present on `matches` are consulted.
pub fn resolve_config(matches: &ArgMatches) -> Result<MonitorConfig> {
    let mut config = match arg::<String>(matches, "config") {
        Some(path) => {
            let mut config = MonitorConfig::load_from(&PathBuf::from(path))?;
            config.apply_env();
            config
        }
        None => MonitorConfig::load()?,
    };

    if let Some(profile) = arg::<String>(matches, "profile") {
        match profile.as_str() {
            "minimal" => {
                config.alerts = MonitorConfig::minimal().alerts;
                config.audit_connections = false;
                config.geoip_db_path = None;
            }
            "extended" => config.audit_connections = true,
            other => bail!("Unknown profile '{}': expected minimal or extended", other),
        }
    }

    if let Some(ms) = arg::<u64>(matches, "interval-ms") {
        config.sample_interval_ms = ms;
    }
    if let Some(threshold) = arg::<f64>(matches, "cpu-threshold") {
        config.alerts.cpu_warn = threshold;
    }
    if let Some(threshold) = arg::<f64>(matches, "mem-threshold") {
        config.alerts.mem_warn = threshold;
    }
    if let Some(path) = arg::<String>(matches, "geoip") {
        config.geoip_db_path = Some(PathBuf::from(path));
    }
    if let Some(port) = arg::<u16>(matches, "port") {
        config.lan.monitor_port = port;
    }
    if let Some(subnet) = arg::<String>(matches, "subnet") {
        config.lan.subnet = Some(subnet);
    }

    Ok(config)
}

/// Value of an optional flag; `None` when the command does not define it
fn arg<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}

/// Multi-threaded Tokio runtime for one command
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("hostwatch-worker")
        .build()
        .context("Failed to start async runtime")
}
