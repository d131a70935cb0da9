//! `watch`: run the sampling loop and print each snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::ArgMatches;

use crate::core::config::MonitorConfig;
use crate::core::system_monitor::{MetricsRuntime, MonitorState, SamplingLoop, Snapshot};
use crate::platform::{get_geo_provider, SysinfoStats};
use crate::ui::monitor_formatters::{print_alert_page, print_snapshot};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;
    let cycles = matches.get_one::<u64>("cycles").copied();
    let json_output = matches.get_flag("json");

    let runtime = super::build_runtime()?;
    let state = runtime.block_on(run_sampler(config, cycles, |snapshot| {
        if json_output {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to encode snapshot: {}", e),
            }
        } else {
            print_snapshot(snapshot);
        }
    }))?;

    if !json_output {
        print_alert_page(&state.alerts(0, 0));
    }
    Ok(())
}

/// Sample until `cycles` snapshots were published or Ctrl-C.
///
/// Returns the state so callers can query the histories afterwards.
pub async fn run_sampler<F>(
    config: MonitorConfig,
    cycles: Option<u64>,
    mut on_snapshot: F,
) -> Result<Arc<MonitorState>>
where
    F: FnMut(&Snapshot),
{
    let geo = get_geo_provider(&config);
    let period = config.sample_interval();

    let sampler = tokio::task::spawn_blocking(move || {
        SamplingLoop::new(Box::new(SysinfoStats::new()), geo, config, Local::now())
    })
    .await
    .context("Failed to initialise host sampler")?;

    // CPU usage needs two readings at least this far apart
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;

    let mut runtime = MetricsRuntime::spawn(sampler, period);
    let state = runtime.state().clone();
    let mut seen = 0u64;

    loop {
        tokio::select! {
            changed = runtime.snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = runtime.snapshot_rx.borrow_and_update().clone();
                on_snapshot(&snapshot);
                seen += 1;
                if cycles.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
        }
    }

    runtime.shutdown().await;
    Ok(state)
}
