use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One CPU utilisation reading, taken over the source's sampling interval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuReading {
    pub per_core_percent: Vec<f64>,
    pub total_percent: f64,
}

/// Physical memory and swap snapshot, byte values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
    /// (total - available) / total * 100
    pub usage_percent: f64,
    pub swap_total_bytes: u64,
    pub swap_free_bytes: u64,
    pub swap_used_bytes: u64,
    /// (total - free) / total * 100
    pub swap_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuInfo {
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub max_frequency_mhz: Option<f64>,
    pub min_frequency_mhz: Option<f64>,
    pub current_frequency_mhz: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub system: String,
    pub node_name: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub processor: String,
    pub boot_time: DateTime<Local>,
}

/// A mounted partition, as listed by the OS
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiskPartition {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub usage_percent: f64,
}

impl DiskUsage {
    pub fn from_total_and_free(total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        DiskUsage {
            total_bytes: total,
            used_bytes: used,
            free_bytes: free,
            usage_percent: percent_of(used, total),
        }
    }
}

/// I/O totals since boot, summed over all disks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DiskIo {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Duplex {
    Full,
    Half,
    #[default]
    Unknown,
}

impl Duplex {
    pub fn label(&self) -> &'static str {
        match self {
            Duplex::Full => "full",
            Duplex::Half => "half",
            Duplex::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicStats {
    pub speed_mb: u64,
    pub duplex: Duplex,
    pub mtu: u64,
    pub is_up: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicIo {
    pub bytes_recv: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub dropin: Option<u64>,
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub errout: u64,
    pub dropout: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
    Mac,
}

impl AddressFamily {
    pub fn label(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "IPv4",
            AddressFamily::Ipv6 => "IPv6",
            AddressFamily::Mac => "MAC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicAddress {
    pub family: AddressFamily,
    pub address: String,
    pub netmask: Option<String>,
    pub broadcast: Option<String>,
    pub ptp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub stats: Option<NicStats>,
    pub io: Option<NicIo>,
    pub addresses: Vec<NicAddress>,
}

pub(crate) fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
