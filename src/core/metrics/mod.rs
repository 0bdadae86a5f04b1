//! Access to OS-level metrics.
//!
//! Everything the sampler and the report read from the host goes through
//! [`MetricsSource`], so both can run against a deterministic source in tests.

mod sysinfo_source;
mod types;

pub use sysinfo_source::SysinfoSource;
pub use types::*;

use crate::error::Result;

/// Capability interface over the host's CPU, memory, disk and network stats
pub trait MetricsSource {
    /// Per-core and overall utilisation. Blocks for the source's sampling
    /// interval, which paces the sampling loop.
    fn read_cpu(&mut self) -> Result<CpuReading>;

    fn read_memory(&mut self) -> Result<MemoryReading>;

    fn cpu_info(&mut self) -> Result<CpuInfo>;

    fn system_identity(&mut self) -> Result<SystemIdentity>;

    fn disk_partitions(&mut self) -> Result<Vec<DiskPartition>>;

    /// Usage of one partition. Returns [`crate::ReportError::PermissionDenied`]
    /// when the mount point cannot be queried.
    fn disk_usage(&mut self, partition: &DiskPartition) -> Result<DiskUsage>;

    fn disk_io(&mut self) -> Result<DiskIo>;

    fn network_interfaces(&mut self) -> Result<Vec<NetworkInterface>>;
}
