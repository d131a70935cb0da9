use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};
use hostwatch::core::config::MonitorConfig;
use hostwatch::core::system_monitor::provider::{ConnStatus, DiskIoCounters, Partition};
use hostwatch::core::system_monitor::{AlertLevel, GeoLookup, MetricsRuntime, SamplingLoop};

use super::support::{tcp, FakeGeo, FakeReadings, FakeStats};

fn engine(
    readings: FakeReadings,
    geo: Option<Arc<dyn GeoLookup>>,
    config: MonitorConfig,
) -> (SamplingLoop, FakeStats, DateTime<Local>) {
    let stats = FakeStats::new(readings);
    let start = Local::now();
    let sampler = SamplingLoop::new(Box::new(stats.clone()), geo, config, start);
    (sampler, stats, start)
}

fn at(start: DateTime<Local>, secs: i64) -> DateTime<Local> {
    start + Duration::seconds(secs)
}

#[test]
fn test_first_cycle_rated_from_baseline() {
    let (mut sampler, stats, start) = engine(FakeReadings::healthy(), None, MonitorConfig::default());

    {
        let mut readings = stats.readings.lock();
        readings.add_traffic("eth0", 4096, 4096);
        readings.add_traffic("wlan0", 1 << 20, 0);
    }
    let snapshot = sampler.run_cycle(at(start, 1));

    // tmpfs partition filtered; root had no disk traffic since the baseline
    assert_eq!(snapshot.disk.len(), 1);
    assert_eq!(snapshot.disk[0].path, "/");
    assert_eq!(snapshot.disk[0].read_speed, 0.0);
    assert_eq!(snapshot.disk[0].used_percent, 25.0);

    // eth0 had a sample at construction, wlan0 did not
    assert_eq!(snapshot.network.len(), 1);
    assert_eq!(snapshot.network[0].interface, "eth0");
    assert_eq!(snapshot.network[0].rx, 4.0);
    assert_eq!(snapshot.perf.net_rx_kbps, 4.0);
}

#[test]
fn test_devices_appearing_after_baseline() {
    let (mut sampler, stats, start) = engine(FakeReadings::healthy(), None, MonitorConfig::default());

    {
        let mut readings = stats.readings.lock();
        readings.partitions.push(Partition {
            device: "sdb1".into(),
            mountpoint: "/data".into(),
            fstype: "ext4".into(),
        });
        readings.disk_io.insert(
            "sdb1".to_string(),
            DiskIoCounters {
                read_bytes: 50 << 30,
                write_bytes: 20 << 30,
            },
        );
        readings.add_traffic("wlan9", 80 << 30, 10 << 30);
    }
    let snapshot = sampler.run_cycle(at(start, 1));

    // New disk: present, zero-rated
    let data = snapshot
        .disk
        .iter()
        .find(|d| d.path == "/data")
        .expect("new partition reported");
    assert_eq!(data.read_speed, 0.0);
    assert_eq!(data.write_speed, 0.0);
    assert_eq!(snapshot.perf.disk_read_kbps, 0.0);

    // New interface: left out entirely
    assert!(snapshot.network.iter().all(|n| n.interface != "wlan9"));
    assert_eq!(snapshot.perf.net_rx_kbps, 0.0);

    // Both are rated from the following cycle on
    {
        let mut readings = stats.readings.lock();
        readings.disk_io.get_mut("sdb1").unwrap().read_bytes += 4096;
        readings.add_traffic("wlan9", 2048, 0);
    }
    let snapshot = sampler.run_cycle(at(start, 2));
    let data = snapshot.disk.iter().find(|d| d.path == "/data").unwrap();
    assert_eq!(data.read_speed, 4.0);
    let wlan = snapshot.network.iter().find(|n| n.interface == "wlan9").unwrap();
    assert_eq!(wlan.rx, 2.0);
}

#[test]
fn test_rates_use_elapsed_time() {
    let (mut sampler, stats, start) = engine(FakeReadings::healthy(), None, MonitorConfig::default());
    sampler.run_cycle(at(start, 1));

    {
        let mut readings = stats.readings.lock();
        readings.add_traffic("eth0", 8192, 2048);
        let disk = readings.disk_io.get_mut("sda1").unwrap();
        disk.read_bytes += 20 * 1024;
        disk.write_bytes += 10 * 1024;
    }
    let snapshot = sampler.run_cycle(at(start, 3));

    assert_eq!(snapshot.network[0].rx, 4.0);
    assert_eq!(snapshot.network[0].tx, 1.0);
    assert_eq!(snapshot.disk[0].read_speed, 10.0);
    assert_eq!(snapshot.disk[0].write_speed, 5.0);
    assert_eq!(snapshot.perf.disk_read_kbps, 10.0);
}

#[test]
fn test_cpu_alert_scenario() {
    let mut readings = FakeReadings::healthy();
    readings.cpu = 85.3;
    let (mut sampler, stats, start) = engine(readings, None, MonitorConfig::default());

    let snapshot = sampler.run_cycle(at(start, 1));
    assert_eq!(snapshot.current.len(), 1);
    assert_eq!(snapshot.current[0].level, AlertLevel::Warn);
    assert!(snapshot.current[0].text.contains("85.3"));
    assert_eq!(snapshot.alerts, snapshot.current);

    // Next cycle below threshold: history keeps it, current is empty
    stats.readings.lock().cpu = 80.0;
    sampler.run_cycle(at(start, 2));
    let latest = sampler.state().latest_snapshot();
    assert!(latest.current.is_empty());
    assert_eq!(latest.alerts.len(), 1);
}

#[test]
fn test_alert_history_bounded_and_paged() {
    let mut readings = FakeReadings::healthy();
    readings.cpu = 95.0;
    readings.mem_percent = 95.0;
    let (mut sampler, _, start) = engine(readings, None, MonitorConfig::default());

    for i in 1..=150 {
        let snapshot = sampler.run_cycle(at(start, i));
        assert!(snapshot.alerts.len() <= 200);
    }

    let state = sampler.state();
    assert_eq!(state.latest_snapshot().alerts.len(), 200);

    let page = state.alerts(10, 195);
    assert_eq!(page.total, 200);
    assert_eq!(page.items.len(), 5);

    assert!(state.alerts(10, 500).items.is_empty());
    assert_eq!(state.alerts(-1, 0).items.len(), 20);
}

#[test]
fn test_net_log_bounded_under_sustained_traffic() {
    let (mut sampler, stats, start) = engine(FakeReadings::healthy(), None, MonitorConfig::minimal());

    for i in 1..=350 {
        stats.readings.lock().add_traffic("eth0", 200 * 1024, 0);
        let snapshot = sampler.run_cycle(at(start, i));
        assert!(snapshot.net_log.len() <= 300);
    }

    let latest = sampler.state().latest_snapshot();
    assert_eq!(latest.net_log.len(), 300);
    assert_eq!(latest.net_log[299].rx, 200.0);
}

#[test]
fn test_quiet_network_logs_heartbeat_every_ten_cycles() {
    let (mut sampler, _, start) = engine(FakeReadings::healthy(), None, MonitorConfig::minimal());

    for i in 1..=9 {
        assert!(sampler.run_cycle(at(start, i)).net_log.is_empty());
    }
    assert_eq!(sampler.run_cycle(at(start, 10)).net_log.len(), 1);

    for i in 11..=25 {
        sampler.run_cycle(at(start, i));
    }
    assert_eq!(sampler.state().latest_snapshot().net_log.len(), 2);
}

#[test]
fn test_burst_resets_heartbeat() {
    let (mut sampler, stats, start) = engine(FakeReadings::healthy(), None, MonitorConfig::minimal());

    for i in 1..=5 {
        sampler.run_cycle(at(start, i));
    }
    stats.readings.lock().add_traffic("eth0", 500 * 1024, 0);
    assert_eq!(sampler.run_cycle(at(start, 6)).net_log.len(), 1);

    // Ten quiet cycles after the burst before the next heartbeat
    for i in 7..=15 {
        assert_eq!(sampler.run_cycle(at(start, i)).net_log.len(), 1);
    }
    assert_eq!(sampler.run_cycle(at(start, 16)).net_log.len(), 2);
}

#[test]
fn test_audit_and_geo_attached_when_enabled() {
    let mut readings = FakeReadings::healthy();
    readings.connections = vec![
        tcp("10.0.0.2:50000", "8.8.8.8:443", ConnStatus::Established, Some(42)),
        tcp("10.0.0.2:50001", "8.8.4.4:443", ConnStatus::Established, Some(42)),
        tcp("10.0.0.2:50002", "192.168.1.5:22", ConnStatus::Established, Some(7)),
        tcp("10.0.0.2:50003", "1.1.1.1:443", ConnStatus::TimeWait, Some(9)),
    ];
    let geo: Arc<dyn GeoLookup> = Arc::new(FakeGeo);
    let (mut sampler, stats, start) = engine(readings, Some(geo), MonitorConfig::extended());

    stats.readings.lock().add_traffic("eth0", 1 << 20, 0);
    let snapshot = sampler.run_cycle(at(start, 1));

    let entry = &snapshot.net_log[0];
    assert_eq!(entry.connections.len(), 2);
    assert_eq!(entry.connections[0].remote_ip, "8.8.8.8");
    assert_eq!(entry.connections[0].process, "proc-42");
    assert_eq!(entry.connections[0].country, "美国");
    assert_eq!(entry.connections[0].city, "-");
    assert_eq!(stats.process_lookups.load(Ordering::SeqCst), 1);

    // Both Google resolvers share one coordinate; 1.1.1.1 has no record
    assert_eq!(snapshot.geo_heat.len(), 1);
    assert_eq!(snapshot.geo_heat[0].count, 2);
    assert_eq!(snapshot.geo_heat[0].city, "");
}

#[test]
fn test_minimal_profile_logs_traffic_only() {
    let mut readings = FakeReadings::healthy();
    readings.connections = vec![tcp(
        "10.0.0.2:50000",
        "8.8.8.8:443",
        ConnStatus::Established,
        Some(42),
    )];
    let (mut sampler, stats, start) = engine(readings, None, MonitorConfig::minimal());

    stats.readings.lock().add_traffic("eth0", 1 << 20, 0);
    let snapshot = sampler.run_cycle(at(start, 1));

    assert_eq!(snapshot.net_log.len(), 1);
    assert!(snapshot.net_log[0].connections.is_empty());
    assert!(snapshot.geo_heat.is_empty());
    assert_eq!(stats.process_lookups.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failing_provider_still_publishes() {
    let mut readings = FakeReadings::healthy();
    readings.broken = true;
    let (mut sampler, _, start) = engine(readings, None, MonitorConfig::default());

    let now = at(start, 1);
    let snapshot = sampler.run_cycle(now);
    assert_eq!(snapshot.timestamp, now.timestamp());
    assert_eq!(snapshot.cpu.usage, 0.0);
    assert_eq!(snapshot.cpu.model_name, "");
    assert!(snapshot.disk.is_empty());
    assert!(snapshot.network.is_empty());
    assert!(snapshot.current.is_empty());
    assert_eq!(sampler.state().latest_snapshot().timestamp, now.timestamp());
}

#[test]
fn test_host_overrides_and_sensor() {
    let config = MonitorConfig {
        hostname_override: Some("nas".into()),
        ..MonitorConfig::default()
    };
    let (mut sampler, _, start) = engine(FakeReadings::healthy(), None, config);

    let snapshot = sampler.run_cycle(at(start, 1));
    assert_eq!(snapshot.system.hostname, "nas");
    assert_eq!(snapshot.system.os, "linux");
    assert_eq!(snapshot.cpu.model_name, "Fake CPU");
    assert_eq!(snapshot.cpu.cores, 2);
    assert_eq!(snapshot.perf.cpu_temp, 48.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runtime_publishes_until_shutdown() {
    let stats = FakeStats::new(FakeReadings::healthy());
    let sampler = SamplingLoop::new(Box::new(stats), None, MonitorConfig::default(), Local::now());

    let mut runtime = MetricsRuntime::spawn(sampler, StdDuration::from_millis(10));
    for _ in 0..3 {
        tokio::time::timeout(StdDuration::from_secs(5), runtime.snapshot_rx.changed())
            .await
            .expect("snapshot within timeout")
            .unwrap();
    }

    let latest = runtime.latest_snapshot();
    assert!(latest.timestamp > 0);
    assert_eq!(latest.system.hostname, "testbox");
    runtime.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runtime_survives_panicking_cycle() {
    let mut readings = FakeReadings::healthy();
    readings.panic_next = true;
    let stats = FakeStats::new(readings);
    let sampler = SamplingLoop::new(Box::new(stats.clone()), None, MonitorConfig::default(), Local::now());

    let mut runtime = MetricsRuntime::spawn(sampler, StdDuration::from_millis(10));
    for _ in 0..2 {
        tokio::time::timeout(StdDuration::from_secs(5), runtime.snapshot_rx.changed())
            .await
            .expect("sampling resumed after the failed cycle")
            .unwrap();
    }

    assert!(!stats.readings.lock().panic_next);
    assert_eq!(runtime.latest_snapshot().cpu.usage, 12.5);
    runtime.shutdown().await;
}
