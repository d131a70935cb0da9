use chrono::{DateTime, Local, TimeZone};
use colored::*;
use humansize::{format_size as human_format_size, BINARY};

/// Format a byte count in human-readable binary units
pub fn format_size(size: u64) -> String {
    human_format_size(size, BINARY)
}

/// Format a KB/s rate, switching to MB/s above 1024
pub fn format_rate(kbps: f64) -> String {
    if kbps >= 1024.0 {
        format!("{:.1} MB/s", kbps / 1024.0)
    } else {
        format!("{:.1} KB/s", kbps)
    }
}

/// Format a Unix timestamp as local time (YYYY-MM-DD HH:MM)
pub fn format_time(unix_secs: u64) -> String {
    match i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
    {
        Some(datetime) => {
            let datetime: DateTime<Local> = datetime;
            datetime.format("%Y-%m-%d %H:%M").to_string()
        }
        None => "-".to_string(),
    }
}

/// Create a usage bar with block characters
pub fn create_usage_bar(usage_percent: f64, width: usize) -> String {
    let clamped = usage_percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));

    // Color the bar based on usage
    let colored_bar = if usage_percent >= 85.0 {
        bar.red()
    } else if usage_percent >= 70.0 {
        bar.yellow()
    } else {
        bar.green()
    };

    format!("[{}]", colored_bar)
}
