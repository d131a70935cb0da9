use std::io;
use thiserror::Error;

/// Custom error type for hostwatch
#[derive(Error, Debug)]
pub enum HostwatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Geo lookup failed: {0}")]
    GeoLookup(String),

    #[error("No usable IPv4 interface found")]
    NoSubnet,

    #[error("Malformed subnet: {0}")]
    MalformedSubnet(String),
}

/// Result type alias for hostwatch
pub type Result<T> = std::result::Result<T, HostwatchError>;

impl HostwatchError {
    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        HostwatchError::MetricCollection(msg.into())
    }

    pub fn geo_lookup<S: Into<String>>(msg: S) -> Self {
        HostwatchError::GeoLookup(msg.into())
    }

    pub fn malformed_subnet<S: Into<String>>(msg: S) -> Self {
        HostwatchError::MalformedSubnet(msg.into())
    }
}
