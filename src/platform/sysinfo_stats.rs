//! `sysinfo`-backed host statistics.

use std::collections::HashMap;
use std::path::Path;

use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, Pid, ProcessRefreshKind,
    ProcessesToUpdate, RefreshKind, System,
};

use crate::core::system_monitor::provider::*;
use crate::error::{HostwatchError, Result};

/// Host statistics through `sysinfo`, plus `/proc/net` sockets on Linux
pub struct SysinfoStats {
    system: System,
    components: Components,
    disks: Disks,
    networks: Networks,
}

impl SysinfoStats {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            components: Components::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemStatsProvider for SysinfoStats {
    fn refresh(&mut self) {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();
        self.disks.refresh(true);
        self.networks.refresh(true);
        self.components.refresh(true);
    }

    fn cpu_percent(&mut self) -> Result<(f64, Vec<f64>)> {
        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(HostwatchError::metric_collection("no CPUs reported"));
        }
        let per_core = cpus.iter().map(|cpu| f64::from(cpu.cpu_usage())).collect();
        Ok((f64::from(self.system.global_cpu_usage()), per_core))
    }

    fn cpu_info(&mut self) -> Result<CpuStatic> {
        let cpu = self
            .system
            .cpus()
            .first()
            .ok_or_else(|| HostwatchError::metric_collection("no CPU info"))?;
        Ok(CpuStatic {
            model_name: cpu.brand().trim().to_string(),
            mhz: cpu.frequency() as f64,
        })
    }

    fn load_average(&mut self) -> Result<LoadAverage> {
        let load = System::load_average();
        Ok(LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        })
    }

    fn virtual_memory(&mut self) -> Result<VirtualMemory> {
        let total = self.system.total_memory();
        if total == 0 {
            return Err(HostwatchError::metric_collection("memory totals unavailable"));
        }
        let used = self.system.used_memory();
        Ok(VirtualMemory {
            total,
            used,
            free: self.system.free_memory(),
            used_percent: used as f64 / total as f64 * 100.0,
        })
    }

    fn swap_memory(&mut self) -> Result<SwapMemory> {
        Ok(SwapMemory {
            total: self.system.total_swap(),
            used: self.system.used_swap(),
        })
    }

    fn disk_partitions(&mut self) -> Result<Vec<Partition>> {
        Ok(self
            .disks
            .iter()
            .map(|disk| Partition {
                device: disk.name().to_string_lossy().to_string(),
                mountpoint: disk.mount_point().to_string_lossy().to_string(),
                fstype: disk.file_system().to_string_lossy().to_string(),
            })
            .collect())
    }

    fn disk_usage(&mut self, path: &str) -> Result<DiskUsage> {
        let target = Path::new(path);
        let disk = self
            .disks
            .iter()
            .filter(|disk| target.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .ok_or_else(|| {
                HostwatchError::metric_collection(format!("no disk mounted at {}", path))
            })?;

        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        Ok(DiskUsage {
            total,
            used,
            used_percent: if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
    }

    fn disk_io_counters(&mut self) -> Result<HashMap<String, DiskIoCounters>> {
        Ok(self
            .disks
            .iter()
            .map(|disk| {
                let usage = disk.usage();
                (
                    disk.name().to_string_lossy().to_string(),
                    DiskIoCounters {
                        read_bytes: usage.total_read_bytes,
                        write_bytes: usage.total_written_bytes,
                    },
                )
            })
            .collect())
    }

    fn net_io_counters(&mut self) -> Result<HashMap<String, NetIoCounters>> {
        Ok(self
            .networks
            .iter()
            .map(|(name, data)| {
                (
                    name.to_string(),
                    NetIoCounters {
                        bytes_recv: data.total_received(),
                        bytes_sent: data.total_transmitted(),
                    },
                )
            })
            .collect())
    }

    fn host_info(&mut self) -> Result<HostIdentity> {
        Ok(HostIdentity {
            hostname: System::host_name().unwrap_or_default(),
            os: std::env::consts::OS.to_string(),
            platform: System::distribution_id(),
            boot_time: System::boot_time(),
        })
    }

    fn sensor_temperatures(&mut self) -> Result<Vec<SensorReading>> {
        Ok(self
            .components
            .iter()
            .filter_map(|comp| {
                comp.temperature().map(|celsius| SensorReading {
                    label: comp.label().to_string(),
                    celsius: f64::from(celsius),
                })
            })
            .collect())
    }

    fn connections(&mut self) -> Result<Vec<InetConnection>> {
        #[cfg(target_os = "linux")]
        {
            super::proc_net::inet_connections()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Ok(Vec::new())
        }
    }

    fn process_name(&mut self, pid: u32) -> Result<String> {
        let pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        self.system
            .process(pid)
            .map(|process| process.name().to_string_lossy().to_string())
            .ok_or_else(|| HostwatchError::metric_collection(format!("no process {}", pid)))
    }
}
