//! Local interface enumeration.

use if_addrs::{get_if_addrs, IfAddr};

use crate::core::lan::{LocalAddressSource, LocalInterface};
use crate::error::{HostwatchError, Result};

/// First non-loopback IPv4 interface reported by the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct IfAddrsSource;

impl LocalAddressSource for IfAddrsSource {
    fn local_ipv4(&self) -> Result<LocalInterface> {
        let interfaces = get_if_addrs()?;

        interfaces
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .find_map(|iface| match iface.addr {
                IfAddr::V4(v4) => {
                    log::debug!("Using interface {} ({})", iface.name, v4.ip);
                    Some(LocalInterface {
                        ip: v4.ip,
                        prefix: u32::from(v4.netmask).count_ones() as u8,
                    })
                }
                IfAddr::V6(_) => None,
            })
            .ok_or(HostwatchError::NoSubnet)
    }
}
