//! Alert evaluation for CPU and memory pressure.
//!
//! Compares the cycle's derived metrics against resolved thresholds. The
//! evaluator never reads configuration storage itself.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::metrics::{AlertLevel, AlertRecord};

/// Alert thresholds (percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub cpu_warn: f64,
    pub mem_warn: f64,
    /// Escalates the CPU alert to `critical` when set and exceeded
    pub cpu_critical: Option<f64>,
    /// Escalates the memory alert to `critical` when set and exceeded
    pub mem_critical: Option<f64>,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_warn: 80.0,
            mem_warn: 90.0,
            cpu_critical: None,
            mem_critical: None,
        }
    }
}

/// Evaluate one cycle's CPU and memory usage.
///
/// At most one alert per metric, CPU first. Comparisons are strict: a value
/// equal to its threshold does not fire.
pub fn evaluate_alerts<Tz>(
    cpu_usage: f64,
    mem_used_percent: f64,
    thresholds: &AlertThresholds,
    now: &DateTime<Tz>,
) -> Vec<AlertRecord>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let time = now.format("%H:%M:%S").to_string();
    let mut alerts = Vec::new();

    if cpu_usage > thresholds.cpu_warn {
        alerts.push(AlertRecord {
            level: level_for(cpu_usage, thresholds.cpu_critical),
            text: format!("CPU usage too high: {:.1}%", cpu_usage),
            time: time.clone(),
        });
    }

    if mem_used_percent > thresholds.mem_warn {
        alerts.push(AlertRecord {
            level: level_for(mem_used_percent, thresholds.mem_critical),
            text: format!("Memory usage too high: {:.1}%", mem_used_percent),
            time,
        });
    }

    alerts
}

fn level_for(value: f64, critical: Option<f64>) -> AlertLevel {
    match critical {
        Some(limit) if value > limit => AlertLevel::Critical,
        _ => AlertLevel::Warn,
    }
}
