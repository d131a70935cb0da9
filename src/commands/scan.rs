use std::sync::Arc;

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::lan::LanDiscovery;
use crate::platform::{IfAddrsSource, SystemProbe};
use crate::ui::monitor_formatters::print_topology;

/// Scan the local segment and print what answered
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let json_output = matches.get_flag("json");

    if !json_output {
        println!("{}", "Scanning local network...".dimmed());
    }

    let runtime = super::build_runtime()?;
    let result = runtime.block_on(async {
        let discovery = LanDiscovery::new(SystemProbe, Arc::new(IfAddrsSource), config.lan);
        discovery.refresh().await
    });

    if json_output {
        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    } else {
        print_topology(&result);
    }
    Ok(())
}
