//! Deterministic metrics source and chart renderer shared by the tests.

use std::path::Path;
use std::time::Duration;

use chrono::{Local, TimeZone};
use hwreport::core::chart::{ChartRenderer, ChartTable, Device};
use hwreport::core::metrics::*;
use hwreport::{ReportError, Result};

pub const GB: u64 = 1024 * 1024 * 1024;

/// Four physical cores, two partitions (one unreadable), one interface
pub struct FakeSource {
    pub pace: Duration,
    pub cpu_reads: usize,
    pub fail_identity: bool,
}

impl FakeSource {
    pub fn new(pace: Duration) -> Self {
        Self {
            pace,
            cpu_reads: 0,
            fail_identity: false,
        }
    }
}

impl MetricsSource for FakeSource {
    fn read_cpu(&mut self) -> Result<CpuReading> {
        std::thread::sleep(self.pace);
        self.cpu_reads += 1;
        let load = (self.cpu_reads % 10) as f64 * 10.0;
        Ok(CpuReading {
            per_core_percent: vec![load, load / 2.0, 5.0, 95.0],
            total_percent: (load + load / 2.0 + 100.0) / 4.0,
        })
    }

    fn read_memory(&mut self) -> Result<MemoryReading> {
        Ok(MemoryReading {
            total_bytes: 16 * GB,
            available_bytes: 10 * GB,
            used_bytes: 6 * GB,
            usage_percent: 37.5,
            swap_total_bytes: 2 * GB,
            swap_free_bytes: 2 * GB,
            swap_used_bytes: 0,
            swap_percent: 0.0,
        })
    }

    fn cpu_info(&mut self) -> Result<CpuInfo> {
        Ok(CpuInfo {
            physical_cores: Some(4),
            logical_cores: 8,
            max_frequency_mhz: Some(4200.0),
            min_frequency_mhz: None,
            current_frequency_mhz: 2800.0,
        })
    }

    fn system_identity(&mut self) -> Result<SystemIdentity> {
        if self.fail_identity {
            return Err(ReportError::metric_collection("identity unavailable"));
        }
        Ok(SystemIdentity {
            system: "Linux".to_string(),
            node_name: "testbox".to_string(),
            release: "6.1.0".to_string(),
            version: "#1 SMP".to_string(),
            machine: "x86_64".to_string(),
            processor: "x86_64".to_string(),
            boot_time: Local
                .with_ymd_and_hms(2022, 8, 1, 9, 5, 3)
                .single()
                .ok_or_else(|| ReportError::other("bad boot time"))?,
        })
    }

    fn disk_partitions(&mut self) -> Result<Vec<DiskPartition>> {
        Ok(vec![
            DiskPartition {
                device: "/dev/sda1".to_string(),
                mount_point: "/".to_string(),
                fs_type: "ext4".to_string(),
            },
            DiskPartition {
                device: "/dev/sr0".to_string(),
                mount_point: "/media/cdrom".to_string(),
                fs_type: "iso9660".to_string(),
            },
        ])
    }

    fn disk_usage(&mut self, partition: &DiskPartition) -> Result<DiskUsage> {
        if partition.device == "/dev/sr0" {
            return Err(ReportError::permission_denied(partition.mount_point.clone()));
        }
        Ok(DiskUsage::from_total_and_free(100 * GB, 40 * GB))
    }

    fn disk_io(&mut self) -> Result<DiskIo> {
        Ok(DiskIo {
            read_bytes: 3 * GB,
            write_bytes: GB,
        })
    }

    fn network_interfaces(&mut self) -> Result<Vec<NetworkInterface>> {
        Ok(vec![NetworkInterface {
            name: "eth0".to_string(),
            stats: Some(NicStats {
                speed_mb: 1000,
                duplex: Duplex::Full,
                mtu: 1500,
                is_up: true,
            }),
            io: Some(NicIo {
                bytes_recv: 2_048_000,
                packets_recv: 1200,
                ..Default::default()
            }),
            addresses: vec![NicAddress {
                family: AddressFamily::Ipv4,
                address: "192.168.1.10".to_string(),
                netmask: Some("255.255.255.0".to_string()),
                broadcast: Some("192.168.1.255".to_string()),
                ptp: None,
            }],
        }])
    }
}

/// Writes a small blank PNG instead of plotting, so tests need no fonts
pub struct StubRenderer;

impl ChartRenderer for StubRenderer {
    fn line_plot(&self, _device: Device, table: &ChartTable, path: &Path) -> Result<()> {
        if table.is_empty() {
            return Err(ReportError::chart("empty table"));
        }
        image::RgbImage::from_pixel(12, 8, image::Rgb([255, 255, 255]))
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ReportError::chart(format!("{:?}", e)))
    }
}
