use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::debug;
use sysinfo::{
    CpuRefreshKind, DiskRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System,
    MINIMUM_CPU_UPDATE_INTERVAL,
};

use crate::error::{ReportError, Result};

use super::types::*;
use super::MetricsSource;

const DEFAULT_CPU_INTERVAL: Duration = Duration::from_secs(1);

/// [`MetricsSource`] backed by the `sysinfo` crate
pub struct SysinfoSource {
    system: System,
    disks: Disks,
    cpu_interval: Duration,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self::with_cpu_interval(DEFAULT_CPU_INTERVAL)
    }

    /// `cpu_interval` is how long each CPU reading measures; it is clamped to
    /// sysinfo's minimum update interval.
    pub fn with_cpu_interval(cpu_interval: Duration) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            disks: Disks::new_with_refreshed_list_specifics(DiskRefreshKind::everything()),
            cpu_interval: cpu_interval.max(MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn read_cpu(&mut self) -> Result<CpuReading> {
        // Usage is the delta between two refreshes
        self.system.refresh_cpu_usage();
        std::thread::sleep(self.cpu_interval);
        self.system.refresh_cpu_usage();

        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(ReportError::metric_collection("no CPUs reported by the OS"));
        }

        Ok(CpuReading {
            per_core_percent: cpus.iter().map(|cpu| cpu.cpu_usage() as f64).collect(),
            total_percent: self.system.global_cpu_usage() as f64,
        })
    }

    fn read_memory(&mut self) -> Result<MemoryReading> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let available = self.system.available_memory();
        let swap_total = self.system.total_swap();
        let swap_free = self.system.free_swap();

        Ok(MemoryReading {
            total_bytes: total,
            available_bytes: available,
            used_bytes: self.system.used_memory(),
            usage_percent: percent_of(total.saturating_sub(available), total),
            swap_total_bytes: swap_total,
            swap_free_bytes: swap_free,
            swap_used_bytes: self.system.used_swap(),
            swap_percent: percent_of(swap_total.saturating_sub(swap_free), swap_total),
        })
    }

    fn cpu_info(&mut self) -> Result<CpuInfo> {
        self.system.refresh_cpu_frequency();
        let cpus = self.system.cpus();

        let (max_frequency_mhz, min_frequency_mhz) = frequency_limits();

        Ok(CpuInfo {
            physical_cores: System::physical_core_count(),
            logical_cores: cpus.len(),
            max_frequency_mhz,
            min_frequency_mhz,
            current_frequency_mhz: cpus.first().map(|c| c.frequency() as f64).unwrap_or(0.0),
        })
    }

    fn system_identity(&mut self) -> Result<SystemIdentity> {
        let boot_time = DateTime::from_timestamp(System::boot_time() as i64, 0)
            .map(|t| t.with_timezone(&Local))
            .ok_or_else(|| ReportError::metric_collection("boot time out of range"))?;

        Ok(SystemIdentity {
            system: System::name().unwrap_or_else(|| "Unknown".to_string()),
            node_name: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
            release: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
            version: System::long_os_version().unwrap_or_else(|| "Unknown".to_string()),
            machine: std::env::consts::ARCH.to_string(),
            processor: self
                .system
                .cpus()
                .first()
                .map(|c| c.brand().trim().to_string())
                .unwrap_or_default(),
            boot_time,
        })
    }

    fn disk_partitions(&mut self) -> Result<Vec<DiskPartition>> {
        self.disks = Disks::new_with_refreshed_list_specifics(DiskRefreshKind::everything());

        Ok(self
            .disks
            .list()
            .iter()
            .map(|disk| DiskPartition {
                device: disk.name().to_string_lossy().to_string(),
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                fs_type: disk.file_system().to_string_lossy().to_string(),
            })
            .collect())
    }

    fn disk_usage(&mut self, partition: &DiskPartition) -> Result<DiskUsage> {
        let mount_point = Path::new(&partition.mount_point);
        if let Err(e) = std::fs::metadata(mount_point) {
            return Err(match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    ReportError::permission_denied(partition.mount_point.clone())
                }
                _ => ReportError::Io(e),
            });
        }

        let disk = self
            .disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == mount_point)
            .ok_or_else(|| {
                ReportError::metric_collection(format!(
                    "partition {} is no longer mounted",
                    partition.mount_point
                ))
            })?;

        Ok(DiskUsage::from_total_and_free(
            disk.total_space(),
            disk.available_space(),
        ))
    }

    fn disk_io(&mut self) -> Result<DiskIo> {
        self.disks.refresh(true);

        Ok(self
            .disks
            .list()
            .iter()
            .map(|disk| disk.usage())
            .fold(DiskIo::default(), |acc, usage| DiskIo {
                read_bytes: acc.read_bytes + usage.total_read_bytes,
                write_bytes: acc.write_bytes + usage.total_written_bytes,
            }))
    }

    fn network_interfaces(&mut self) -> Result<Vec<NetworkInterface>> {
        let networks = Networks::new_with_refreshed_list();

        let mut interfaces: Vec<NetworkInterface> = networks
            .iter()
            .map(|(name, data)| {
                let mut addresses: Vec<NicAddress> = data
                    .ip_networks()
                    .iter()
                    .map(|net| ip_address(net.addr, net.prefix))
                    .collect();
                addresses.push(NicAddress {
                    family: AddressFamily::Mac,
                    address: data.mac_address().to_string(),
                    netmask: None,
                    broadcast: None,
                    ptp: None,
                });

                NetworkInterface {
                    name: name.to_string(),
                    stats: link_stats(name),
                    io: Some(NicIo {
                        bytes_recv: data.total_received(),
                        packets_recv: data.total_packets_received(),
                        errin: data.total_errors_on_received(),
                        dropin: None,
                        bytes_sent: data.total_transmitted(),
                        packets_sent: data.total_packets_transmitted(),
                        errout: data.total_errors_on_transmitted(),
                        dropout: None,
                    }),
                    addresses,
                }
            })
            .collect();

        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Found {} network interfaces", interfaces.len());
        Ok(interfaces)
    }
}

fn ip_address(addr: IpAddr, prefix: u8) -> NicAddress {
    match addr {
        IpAddr::V4(v4) => {
            let mask = u32::MAX.checked_shl(32 - prefix.min(32) as u32).unwrap_or(0);
            let broadcast = (!v4.is_loopback() && prefix < 31)
                .then(|| Ipv4Addr::from(u32::from(v4) | !mask).to_string());
            NicAddress {
                family: AddressFamily::Ipv4,
                address: v4.to_string(),
                netmask: Some(Ipv4Addr::from(mask).to_string()),
                broadcast,
                ptp: None,
            }
        }
        IpAddr::V6(v6) => {
            let mask = u128::MAX.checked_shl(128 - prefix.min(128) as u32).unwrap_or(0);
            NicAddress {
                family: AddressFamily::Ipv6,
                address: v6.to_string(),
                netmask: Some(Ipv6Addr::from(mask).to_string()),
                broadcast: None,
                ptp: None,
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn read_sysfs(path: impl AsRef<Path>) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}

/// cpufreq limits in MHz, when the kernel exposes them
#[cfg(target_os = "linux")]
fn frequency_limits() -> (Option<f64>, Option<f64>) {
    let khz = |file: &str| {
        read_sysfs(format!("/sys/devices/system/cpu/cpu0/cpufreq/{}", file))
            .and_then(|s| s.parse::<f64>().ok())
            .map(|khz| khz / 1000.0)
    };
    (khz("cpuinfo_max_freq"), khz("cpuinfo_min_freq"))
}

#[cfg(not(target_os = "linux"))]
fn frequency_limits() -> (Option<f64>, Option<f64>) {
    (None, None)
}

#[cfg(target_os = "linux")]
fn link_stats(name: &str) -> Option<NicStats> {
    let base = Path::new("/sys/class/net").join(name);
    let mtu = read_sysfs(base.join("mtu"))?.parse().ok()?;

    // speed reads -1 or fails on virtual links
    let speed_mb = read_sysfs(base.join("speed"))
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(0) as u64;
    let duplex = match read_sysfs(base.join("duplex")).as_deref() {
        Some("full") => Duplex::Full,
        Some("half") => Duplex::Half,
        _ => Duplex::Unknown,
    };
    let is_up = read_sysfs(base.join("flags"))
        .and_then(|s| u32::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .map(|flags| flags & 0x1 != 0)
        .unwrap_or(false);

    Some(NicStats {
        speed_mb,
        duplex,
        mtu,
        is_up,
    })
}

#[cfg(not(target_os = "linux"))]
fn link_stats(_name: &str) -> Option<NicStats> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_netmask_and_broadcast() {
        let addr = ip_address(IpAddr::V4(Ipv4Addr::new(172, 17, 0, 1)), 16);
        assert_eq!(addr.family, AddressFamily::Ipv4);
        assert_eq!(addr.netmask.as_deref(), Some("255.255.0.0"));
        assert_eq!(addr.broadcast.as_deref(), Some("172.17.255.255"));
    }

    #[test]
    fn test_loopback_has_no_broadcast() {
        let addr = ip_address(IpAddr::V4(Ipv4Addr::LOCALHOST), 8);
        assert_eq!(addr.netmask.as_deref(), Some("255.0.0.0"));
        assert!(addr.broadcast.is_none());
    }

    #[test]
    fn test_ipv6_netmask() {
        let addr = ip_address(IpAddr::V6(Ipv6Addr::LOCALHOST), 128);
        assert_eq!(addr.family, AddressFamily::Ipv6);
        assert_eq!(
            addr.netmask.as_deref(),
            Some("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")
        );

        let addr = ip_address(IpAddr::V6(Ipv6Addr::LOCALHOST), 64);
        assert_eq!(addr.netmask.as_deref(), Some("ffff:ffff:ffff:ffff::"));
    }

    #[test]
    fn test_zero_prefix() {
        let addr = ip_address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), 0);
        assert_eq!(addr.netmask.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_live_memory_reading_is_consistent() {
        let mut source = SysinfoSource::new();
        let memory = source.read_memory().unwrap();
        assert!(memory.available_bytes <= memory.total_bytes);
        assert!((0.0..=100.0).contains(&memory.usage_percent));
    }
}
