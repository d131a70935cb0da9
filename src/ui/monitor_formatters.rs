use colored::*;

use crate::core::lan::ScanResult;
use crate::core::system_monitor::{
    AlertLevel, AlertPage, AlertRecord, ConnectionAudit, GeoPoint, Snapshot,
};

use super::formatters::{create_usage_bar, format_rate, format_size, format_time};

const BAR_WIDTH: usize = 20;

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

/// Compact one-screen view of a snapshot
pub fn print_snapshot(snapshot: &Snapshot) {
    let system = &snapshot.system;
    println!(
        "\n{} {} ({} {}) up since {}",
        "HOST".bold().bright_cyan(),
        system.hostname.bold(),
        system.os,
        system.platform,
        format_time(system.boot_time)
    );

    let cpu = &snapshot.cpu;
    println!(
        "  CPU  {} {:5.1}%  {} x{} @ {:.0} MHz  load {:.2} {:.2} {:.2}",
        create_usage_bar(cpu.usage, BAR_WIDTH),
        cpu.usage,
        cpu.model_name,
        cpu.cores,
        cpu.mhz,
        cpu.load1,
        cpu.load5,
        cpu.load15
    );

    let memory = &snapshot.memory;
    println!(
        "  MEM  {} {:5.1}%  {} / {}  swap {} / {}",
        create_usage_bar(memory.used_percent, BAR_WIDTH),
        memory.used_percent,
        format_size(memory.used),
        format_size(memory.total),
        format_size(memory.swap_used),
        format_size(memory.swap_total)
    );

    for disk in &snapshot.disk {
        println!(
            "  DISK {} {:5.1}%  {}  r {}  w {}",
            create_usage_bar(disk.used_percent, BAR_WIDTH),
            disk.used_percent,
            disk.path,
            format_rate(disk.read_speed),
            format_rate(disk.write_speed)
        );
    }

    let perf = &snapshot.perf;
    println!(
        "  NET  rx {}  tx {}  ({} interfaces)",
        format_rate(perf.net_rx_kbps),
        format_rate(perf.net_tx_kbps),
        snapshot.network.len()
    );
    if perf.cpu_temp > 0.0 {
        println!("  TEMP {:.1}°C", perf.cpu_temp);
    }

    for alert in &snapshot.current {
        println!("  {}", format_alert(alert));
    }

    if !snapshot.geo_heat.is_empty() {
        print_geo_points(&snapshot.geo_heat);
    }
}

pub fn format_alert(alert: &AlertRecord) -> String {
    let level = match alert.level {
        AlertLevel::Warn => alert.level.as_str().to_uppercase().yellow(),
        AlertLevel::Critical => alert.level.as_str().to_uppercase().red().bold(),
    };
    format!("[{}] {} {}", alert.time.dimmed(), level, alert.text)
}

pub fn print_alert_page(page: &AlertPage) {
    print_section_header(&format!("ALERTS ({} total)", page.total));
    if page.items.is_empty() {
        println!("  {}", "No alerts".dimmed());
        return;
    }
    for alert in &page.items {
        println!("  {}", format_alert(alert));
    }
}

pub fn print_connections(connections: &[ConnectionAudit]) {
    print_section_header("PUBLIC CONNECTIONS");
    if connections.is_empty() {
        println!("  {}", "No established public connections".dimmed());
        return;
    }

    println!(
        "  {:<4} {:<40} {:>6}  {:<12} {:<16} {}",
        "PROTO".bold(),
        "REMOTE".bold(),
        "LOCAL".bold(),
        "STATUS".bold(),
        "PROCESS".bold(),
        "LOCATION".bold()
    );
    for conn in connections {
        let remote = format!("{}:{}", conn.remote_ip, conn.remote_port);
        println!(
            "  {:<5} {:<40} {:>6}  {:<12} {:<16} {} / {}",
            conn.protocol,
            remote.cyan(),
            conn.local_port,
            conn.status,
            conn.process,
            conn.country,
            conn.city
        );
    }
}

fn print_geo_points(points: &[GeoPoint]) {
    print_section_header("GEO");
    for point in points {
        println!(
            "  ({:>8.3}, {:>8.3}) x{:<4} {} {}",
            point.lat, point.lon, point.count, point.country, point.city
        );
    }
}

pub fn print_topology(result: &ScanResult) {
    print_section_header("LAN TOPOLOGY");

    if result.subnet.is_empty() {
        println!("  {}", "No usable IPv4 interface found".yellow());
        return;
    }
    println!("  Local IP: {}", result.local_ip.bold());
    println!("  Subnet:   {}", result.subnet);
    println!();

    if result.hosts.is_empty() {
        println!("  {}", "No hosts answered".dimmed());
        return;
    }

    for host in &result.hosts {
        let monitor = if host.has_monitor {
            "monitor".green()
        } else {
            "-".dimmed()
        };
        let hostname = if host.hostname.is_empty() {
            "-".to_string()
        } else {
            host.hostname.clone()
        };
        println!(
            "  {:<16} {:>9}  {:<8} {}",
            host.ip.cyan(),
            host.latency,
            monitor,
            hostname
        );
    }
    println!("\n  {} hosts", result.hosts.len());
}
