//! Coordinate buckets of public remote endpoints.

use std::collections::HashMap;

use super::audit::public_remote;
use super::metrics::GeoPoint;
use super::provider::{GeoLookup, InetConnection};

pub const MAX_GEO_POINTS: usize = 200;

/// Bucket this cycle's public peers by exact (lat, lon).
///
/// Buckets are rebuilt from scratch on each call and keep first-seen order.
/// Country/city are overwritten by every contribution. Output beyond
/// [`MAX_GEO_POINTS`] is dropped.
pub fn aggregate_geo(
    connections: &[InetConnection],
    geo: &dyn GeoLookup,
    locale: &str,
) -> Vec<GeoPoint> {
    // Keyed on the raw bit patterns: exact equality, no rounding
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut points: Vec<GeoPoint> = Vec::new();

    for conn in connections {
        let Some(remote) = public_remote(conn) else {
            continue;
        };
        let Ok(record) = geo.lookup(remote.ip()) else {
            continue;
        };

        let key = (record.latitude.to_bits(), record.longitude.to_bits());
        let slot = *index.entry(key).or_insert_with(|| {
            points.push(GeoPoint {
                lat: record.latitude,
                lon: record.longitude,
                ..Default::default()
            });
            points.len() - 1
        });

        let point = &mut points[slot];
        point.count += 1;
        point.country = record.country(locale).unwrap_or_default().to_string();
        point.city = record.city(locale).unwrap_or_default().to_string();
    }

    points.truncate(MAX_GEO_POINTS);
    points
}
