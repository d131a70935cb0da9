//! Audit of externally-facing connections.
//!
//! Keeps established sockets with a public peer, names the owning process and
//! tags the peer with country/city when a geo database is configured.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use super::metrics::ConnectionAudit;
use super::provider::{ConnStatus, GeoLookup, InetConnection};

pub const MAX_AUDIT_RECORDS: usize = 20;

const UNKNOWN_PROCESS: &str = "unknown";
const UNRESOLVED: &str = "-";

/// RFC1918, loopback, multicast or unspecified.
///
/// Non-IPv4 addresses are private only through the loopback, multicast and
/// unspecified checks.
pub fn is_private_ip(ip: IpAddr) -> bool {
    if ip.is_loopback() || ip.is_multicast() || ip.is_unspecified() {
        return true;
    }
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            a == 10 || (a == 172 && (16..=31).contains(&b)) || (a == 192 && b == 168)
        }
        // An IPv4-mapped address is judged by its embedded IPv4 address
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_ip(IpAddr::V4(v4)),
            None => false,
        },
    }
}

/// Peer address if it is public
pub fn public_remote(conn: &InetConnection) -> Option<SocketAddr> {
    conn.remote.filter(|addr| !is_private_ip(addr.ip()))
}

/// Audit a connection list, capped at [`MAX_AUDIT_RECORDS`] in provider order.
///
/// `process_name` is consulted at most once per pid within this call.
pub fn audit_connections<F>(
    connections: &[InetConnection],
    mut process_name: F,
    geo: Option<&dyn GeoLookup>,
    locale: &str,
) -> Vec<ConnectionAudit>
where
    F: FnMut(u32) -> Option<String>,
{
    let mut out = Vec::new();
    let mut names: HashMap<u32, String> = HashMap::new();

    for conn in connections {
        if conn.status != ConnStatus::Established {
            continue;
        }
        let Some(remote) = public_remote(conn) else {
            continue;
        };

        let pid = conn.pid.unwrap_or(0);
        let process = names
            .entry(pid)
            .or_insert_with(|| {
                if pid == 0 {
                    return UNKNOWN_PROCESS.to_string();
                }
                process_name(pid)
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| UNKNOWN_PROCESS.to_string())
            })
            .clone();

        let (country, city) = geo
            .and_then(|geo| geo.lookup(remote.ip()).ok())
            .map(|record| {
                (
                    record.country(locale).unwrap_or(UNRESOLVED).to_string(),
                    record.city(locale).unwrap_or(UNRESOLVED).to_string(),
                )
            })
            .unwrap_or_else(|| (UNRESOLVED.to_string(), UNRESOLVED.to_string()));

        out.push(ConnectionAudit {
            remote_ip: remote.ip().to_string(),
            remote_port: remote.port(),
            local_port: conn.local.port(),
            protocol: conn.protocol.as_str().to_string(),
            status: conn.status.as_str().to_string(),
            process,
            country,
            city,
        });

        if out.len() >= MAX_AUDIT_RECORDS {
            break;
        }
    }

    out
}
