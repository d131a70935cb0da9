use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;

use crate::core::config::MonitorConfig;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => show(sub_matches),
        Some(("path", _)) => {
            println!("{}", MonitorConfig::get_config_path()?.display());
            Ok(())
        }
        Some(("init", sub_matches)) => init(sub_matches),
        _ => {
            println!("Use 'hostwatch config --help' for more information.");
            Ok(())
        }
    }
}

/// Print the effective configuration as JSON
fn show(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
    println!("{}", json);
    Ok(())
}

/// Write a default config file, refusing to overwrite unless forced
fn init(matches: &ArgMatches) -> Result<()> {
    let path = match matches.get_one::<String>("path") {
        Some(path) => PathBuf::from(path),
        None => MonitorConfig::get_config_path()?,
    };

    if path.exists() && !matches.get_flag("force") {
        println!(
            "{} {} already exists (use --force to overwrite)",
            "✗".red(),
            path.display()
        );
        return Ok(());
    }

    let profile = match matches.get_one::<String>("profile").map(String::as_str) {
        Some("minimal") => MonitorConfig::minimal(),
        _ => MonitorConfig::extended(),
    };
    profile.save_to(&path)?;

    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
