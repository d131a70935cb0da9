//! IPv4 subnet arithmetic for the LAN scan.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{HostwatchError, Result};

/// Narrowest prefix a scan will cover
pub const SCAN_PREFIX: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Subnet {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Subnet {
    /// Subnet containing `addr`; host bits are cleared
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self> {
        if prefix > 32 {
            return Err(HostwatchError::malformed_subnet(format!(
                "{}/{}: prefix out of range",
                addr, prefix
            )));
        }
        Ok(Self {
            network: Ipv4Addr::from(u32::from(addr) & mask(prefix)),
            prefix,
        })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask(self.prefix) == u32::from(self.network)
    }

    /// Every address in the subnet, network and broadcast included
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start = u32::from(self.network);
        let end = start | !mask(self.prefix);
        (start..=end).map(Ipv4Addr::from)
    }
}

impl fmt::Display for Ipv4Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for Ipv4Subnet {
    type Err = HostwatchError;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| HostwatchError::malformed_subnet(format!("{}: missing prefix", s)))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| HostwatchError::malformed_subnet(format!("{}: bad address", s)))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| HostwatchError::malformed_subnet(format!("{}: bad prefix", s)))?;
        Self::new(addr, prefix)
    }
}

/// Subnet to scan for an interface address.
///
/// Masks broader than /24 are narrowed to the /24 around `addr`; narrower
/// masks are kept as they are.
pub fn scan_subnet_for(addr: Ipv4Addr, prefix: u8) -> Result<Ipv4Subnet> {
    Ipv4Subnet::new(addr, prefix.max(SCAN_PREFIX))
}

/// Probe candidates: skips `.0` and `.255` and keeps at most `cap`
pub fn candidate_addresses(subnet: &Ipv4Subnet, cap: usize) -> Vec<Ipv4Addr> {
    subnet
        .addresses()
        .filter(|ip| !matches!(ip.octets()[3], 0 | 255))
        .take(cap)
        .collect()
}

fn mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}
