//! Capabilities the LAN scan needs from the host.

use std::future::Future;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::Result;

/// Liveness, port and name probes against one address.
///
/// Every probe is best effort: failures come back as `None`/`false`.
pub trait Reachability: Send + Sync + 'static {
    /// Single-attempt liveness check; elapsed time on success
    fn ping(&self, ip: Ipv4Addr, timeout: Duration)
        -> impl Future<Output = Option<Duration>> + Send;

    fn port_open(&self, ip: Ipv4Addr, port: u16, timeout: Duration)
        -> impl Future<Output = bool> + Send;

    /// Reverse name, without a trailing dot
    fn reverse_lookup(&self, ip: Ipv4Addr, timeout: Duration)
        -> impl Future<Output = Option<String>> + Send;
}

/// First usable local IPv4 interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalInterface {
    pub ip: Ipv4Addr,
    pub prefix: u8,
}

pub trait LocalAddressSource: Send + Sync {
    /// Fails with `NoSubnet` when only loopback or IPv6 addresses exist
    fn local_ipv4(&self) -> Result<LocalInterface>;
}
