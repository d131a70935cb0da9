//! Inet socket table from `/proc/net`.
//!
//! Addresses in these files are hex in host byte order; this assumes a
//! little-endian host.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::core::system_monitor::provider::{ConnStatus, InetConnection, Protocol};

/// One socket table file and how to read it
#[derive(Debug, Clone, Copy)]
pub struct SocketTable {
    pub path: &'static str,
    pub protocol: Protocol,
}

pub const SOCKET_TABLES: &[SocketTable] = &[
    SocketTable { path: "/proc/net/tcp", protocol: Protocol::Tcp },
    SocketTable { path: "/proc/net/tcp6", protocol: Protocol::Tcp },
    SocketTable { path: "/proc/net/udp", protocol: Protocol::Udp },
    SocketTable { path: "/proc/net/udp6", protocol: Protocol::Udp },
];

/// A parsed row, before the owning pid is known
#[derive(Debug, Clone, PartialEq)]
pub struct SocketRow {
    pub local: SocketAddr,
    pub remote: Option<SocketAddr>,
    pub status: ConnStatus,
    pub inode: u64,
}

/// Parse one table; malformed rows are skipped
pub fn parse_socket_table(content: &str, protocol: Protocol) -> Vec<SocketRow> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| parse_row(line, protocol))
        .collect()
}

fn parse_row(line: &str, protocol: Protocol) -> Option<SocketRow> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 10 {
        return None;
    }

    let local = parse_addr(parts[1])?;
    let remote = parse_addr(parts[2])?;
    let status = match protocol {
        Protocol::Tcp => tcp_state(parts[3]),
        Protocol::Udp => ConnStatus::None,
    };
    let inode = parts[9].parse().unwrap_or(0);

    Some(SocketRow {
        local,
        remote: (!remote.ip().is_unspecified() || remote.port() != 0).then_some(remote),
        status,
        inode,
    })
}

/// `0100007F:0050` → 127.0.0.1:80; IPv6 addresses are four such words
pub fn parse_addr(hex_addr: &str) -> Option<SocketAddr> {
    let (ip_hex, port_hex) = hex_addr.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;

    let ip = match ip_hex.len() {
        8 => {
            let word = u32::from_str_radix(ip_hex, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.swap_bytes()))
        }
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                let word = u32::from_str_radix(ip_hex.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };

    Some(SocketAddr::new(ip, port))
}

fn tcp_state(hex: &str) -> ConnStatus {
    match hex {
        "01" => ConnStatus::Established,
        "02" => ConnStatus::SynSent,
        "03" => ConnStatus::SynRecv,
        "04" => ConnStatus::FinWait1,
        "05" => ConnStatus::FinWait2,
        "06" => ConnStatus::TimeWait,
        "07" => ConnStatus::Close,
        "08" => ConnStatus::CloseWait,
        "09" => ConnStatus::LastAck,
        "0A" => ConnStatus::Listen,
        "0B" => ConnStatus::Closing,
        _ => ConnStatus::None,
    }
}

/// `socket:[12345]` → 12345
pub fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Join rows with the inode owner map
pub fn attach_pids(
    rows: Vec<SocketRow>,
    protocol: Protocol,
    owners: &HashMap<u64, u32>,
) -> impl Iterator<Item = InetConnection> + '_ {
    rows.into_iter().map(move |row| InetConnection {
        protocol,
        status: row.status,
        local: row.local,
        remote: row.remote,
        pid: owners.get(&row.inode).copied(),
    })
}

#[cfg(target_os = "linux")]
mod linux {
    use std::collections::HashMap;
    use std::fs;

    use super::*;
    use crate::error::Result;

    /// Socket inode → owning pid, from `/proc/<pid>/fd`.
    ///
    /// Processes we may not inspect are skipped.
    pub fn socket_owners() -> HashMap<u64, u32> {
        let mut owners = HashMap::new();
        let Ok(proc_dir) = fs::read_dir("/proc") else {
            return owners;
        };

        for entry in proc_dir.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
                continue;
            };
            for fd in fds.flatten() {
                if let Ok(link) = fs::read_link(fd.path()) {
                    if let Some(inode) = socket_inode(&link.to_string_lossy()) {
                        owners.insert(inode, pid);
                    }
                }
            }
        }

        owners
    }

    /// Every inet socket on the host.
    ///
    /// Fails only when none of the tables can be read.
    pub fn inet_connections() -> Result<Vec<InetConnection>> {
        let mut tables = Vec::new();
        let mut last_err = None;
        for table in SOCKET_TABLES {
            match fs::read_to_string(table.path) {
                Ok(content) => tables.push((table.protocol, content)),
                Err(e) => {
                    log::debug!("Cannot read {}: {}", table.path, e);
                    last_err = Some(e);
                }
            }
        }
        if tables.is_empty() {
            if let Some(e) = last_err {
                return Err(e.into());
            }
        }

        let owners = socket_owners();
        let mut connections = Vec::new();
        for (protocol, content) in tables {
            let rows = parse_socket_table(&content, protocol);
            connections.extend(attach_pids(rows, protocol, &owners));
        }
        Ok(connections)
    }
}

#[cfg(target_os = "linux")]
pub use linux::{inet_connections, socket_owners};
