use std::collections::HashMap;
use std::fs;

use hostwatch::core::config::MonitorConfig;
use tempfile::TempDir;

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = MonitorConfig::extended();
    config.sample_interval_ms = 2500;
    config.alerts.cpu_critical = Some(95.0);
    config.lan.subnet = Some("10.0.0.0/24".to_string());
    config.save_to(&path).unwrap();

    let loaded = MonitorConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "sample_interval_ms": 500, "alerts": { "cpu_warn": 60.0 }, "lan": { "monitor_port": 9000 } }"#,
    )
    .unwrap();

    let config = MonitorConfig::load_from(&path).unwrap();
    assert_eq!(config.sample_interval_ms, 500);
    assert_eq!(config.alerts.cpu_warn, 60.0);
    assert_eq!(config.alerts.mem_warn, 90.0);
    assert_eq!(config.lan.monitor_port, 9000);
    assert_eq!(config.lan.max_concurrency, 50);
    assert_eq!(config.net_log.heartbeat_cycles, 10);
}

#[test]
fn test_empty_file_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "  \n").unwrap();

    assert_eq!(MonitorConfig::load_from(&path).unwrap(), MonitorConfig::default());
}

#[test]
fn test_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = MonitorConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(MonitorConfig::load_from(&temp_dir.path().join("absent.json")).is_err());
}

#[test]
fn test_environment_wins_over_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{ "alerts": { "cpu_warn": 60.0 }, "host_root": "/srv" }"#).unwrap();

    let env: HashMap<&str, &str> = [
        ("ALERT_CPU_WARN", "75"),
        ("ALERT_MEM_CRITICAL", "97.5"),
        ("HOST_ROOT", "/host"),
    ]
    .into_iter()
    .collect();

    let mut config = MonitorConfig::load_from(&path).unwrap();
    config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.alerts.cpu_warn, 75.0);
    assert_eq!(config.alerts.mem_critical, Some(97.5));
    assert_eq!(config.host_root.as_deref(), Some(std::path::Path::new("/host")));
}
