//! MaxMind City database lookups.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, Reader};

use crate::core::system_monitor::provider::{GeoLookup, GeoRecord};
use crate::error::{HostwatchError, Result};

/// Reader over a GeoLite2/GeoIP2 City database held in memory
pub struct MaxMindGeo {
    reader: Reader<Vec<u8>>,
}

impl MaxMindGeo {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = Reader::open_readfile(path).map_err(|e| {
            HostwatchError::geo_lookup(format!("cannot open {}: {}", path.display(), e))
        })?;
        log::info!("GeoIP database loaded from {}", path.display());
        Ok(Self { reader })
    }
}

impl GeoLookup for MaxMindGeo {
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        let city: geoip2::City = self
            .reader
            .lookup(ip)
            .map_err(|e| HostwatchError::geo_lookup(format!("{}: {}", ip, e)))?;

        let location = city.location.as_ref();
        Ok(GeoRecord {
            latitude: location.and_then(|l| l.latitude).unwrap_or(0.0),
            longitude: location.and_then(|l| l.longitude).unwrap_or(0.0),
            country_names: owned_names(city.country.as_ref().and_then(|c| c.names.as_ref())),
            city_names: owned_names(city.city.as_ref().and_then(|c| c.names.as_ref())),
        })
    }
}

fn owned_names(names: Option<&BTreeMap<&str, &str>>) -> BTreeMap<String, String> {
    names
        .map(|names| {
            names
                .iter()
                .map(|(locale, name)| (locale.to_string(), name.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
