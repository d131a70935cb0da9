//! One pass over the local segment.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::config::LanConfig;

use super::model::{Host, ScanResult};
use super::probe::{LocalAddressSource, Reachability};
use super::subnet::{candidate_addresses, scan_subnet_for, Ipv4Subnet};

pub const SELF_HOSTNAME: &str = "hostwatch (this host)";

/// Per-probe settings copied into every probe task
#[derive(Debug, Clone, Copy)]
struct ProbePlan {
    local_ip: Option<Ipv4Addr>,
    monitor_port: u16,
    ping_timeout: Duration,
    port_timeout: Duration,
    dns_timeout: Duration,
}

/// Resolve the segment and scan it.
///
/// Never fails: a missing interface or a malformed subnet yields a result
/// with no hosts.
pub async fn perform_scan<P: Reachability>(
    prober: Arc<P>,
    source: &dyn LocalAddressSource,
    config: &LanConfig,
) -> ScanResult {
    let local = match source.local_ipv4() {
        Ok(local) => Some(local),
        Err(e) => {
            log::warn!("No local IPv4 interface: {}", e);
            None
        }
    };

    let subnet = match (&config.subnet, local) {
        (Some(cidr), _) => cidr.parse::<Ipv4Subnet>(),
        (None, Some(local)) => scan_subnet_for(local.ip, local.prefix),
        (None, None) => return ScanResult::default(),
    };

    let mut result = ScanResult {
        local_ip: local.map(|l| l.ip.to_string()).unwrap_or_default(),
        ..Default::default()
    };

    match subnet {
        Ok(subnet) => {
            result.subnet = subnet.to_string();
            log::info!("Scanning {}", subnet);
            result.hosts = scan_subnet(prober, subnet, local.map(|l| l.ip), config).await;
            log::info!("Scan of {} found {} hosts", subnet, result.hosts.len());
        }
        Err(e) => {
            log::warn!("Not scanning: {}", e);
            result.subnet = config.subnet.clone().unwrap_or_default();
        }
    }

    result
}

/// Probe every candidate of `subnet` with at most `max_concurrency` probes
/// in flight. Hosts come back sorted by address.
pub async fn scan_subnet<P: Reachability>(
    prober: Arc<P>,
    subnet: Ipv4Subnet,
    local_ip: Option<Ipv4Addr>,
    config: &LanConfig,
) -> Vec<Host> {
    let plan = ProbePlan {
        local_ip,
        monitor_port: config.monitor_port,
        ping_timeout: config.ping_timeout(),
        port_timeout: config.port_timeout(),
        dns_timeout: config.dns_timeout(),
    };
    let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut probes = JoinSet::new();

    for ip in candidate_addresses(&subnet, config.max_candidates) {
        // Wait for a slot before spawning so at most N tasks exist at once
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let prober = prober.clone();
        probes.spawn(async move {
            let _permit = permit;
            probe_host(prober.as_ref(), ip, plan).await
        });
    }

    let mut found = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok(Some(host)) => found.push(host),
            Ok(None) => {}
            Err(e) => log::debug!("Probe task failed: {}", e),
        }
    }

    found.sort_by_key(|(ip, _)| *ip);
    found.into_iter().map(|(_, host)| host).collect()
}

async fn probe_host<P: Reachability>(
    prober: &P,
    ip: Ipv4Addr,
    plan: ProbePlan,
) -> Option<(Ipv4Addr, Host)> {
    if plan.local_ip == Some(ip) {
        return Some((
            ip,
            Host {
                ip: ip.to_string(),
                hostname: SELF_HOSTNAME.to_string(),
                latency: "0ms".to_string(),
                has_monitor: true,
            },
        ));
    }

    let elapsed = prober.ping(ip, plan.ping_timeout).await?;
    let has_monitor = prober
        .port_open(ip, plan.monitor_port, plan.port_timeout)
        .await;
    let hostname = prober
        .reverse_lookup(ip, plan.dns_timeout)
        .await
        .map(|name| name.trim_end_matches('.').to_string())
        .unwrap_or_default();

    Some((
        ip,
        Host {
            ip: ip.to_string(),
            hostname,
            latency: format_latency(elapsed),
            has_monitor,
        },
    ))
}

/// Milliseconds with one decimal, e.g. `"2.4ms"`
pub fn format_latency(elapsed: Duration) -> String {
    format!("{:.1}ms", elapsed.as_micros() as f64 / 1000.0)
}
