use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::system_monitor::audit::audit_connections;
use crate::core::system_monitor::SystemStatsProvider;
use crate::platform::{get_geo_provider, SysinfoStats};
use crate::ui::monitor_formatters::print_connections;

/// One connection-audit pass over the current socket table
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let geo = get_geo_provider(&config);

    let mut stats = SysinfoStats::new();
    let connections = stats
        .connections()
        .context("Failed to list inet connections")?;

    let audit = audit_connections(
        &connections,
        |pid| stats.process_name(pid).ok(),
        geo.as_deref(),
        &config.geo_locale,
    );

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&audit)?);
    } else {
        print_connections(&audit);
    }
    Ok(())
}
