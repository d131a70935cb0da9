use anyhow::Result;
use clap::ArgMatches;

use crate::core::system_monitor::parse_page_params;
use crate::ui::monitor_formatters::print_alert_page;

/// Sample a fixed number of cycles, then page through the alert history
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let cycles = matches.get_one::<u64>("cycles").copied().unwrap_or(10);
    let (limit, offset) = parse_page_params(
        matches.get_one::<String>("limit").map(String::as_str),
        matches.get_one::<String>("offset").map(String::as_str),
    );

    let runtime = super::build_runtime()?;
    let state = runtime.block_on(super::watch::run_sampler(config, Some(cycles), |_| {}))?;
    let page = state.alerts(limit, offset);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_alert_page(&page);
    }
    Ok(())
}
