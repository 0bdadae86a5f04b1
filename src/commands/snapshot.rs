//! `hwreport snapshot`: one-shot live metrics as JSON, for scripting.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::metrics::{
    CpuInfo, CpuReading, DiskIo, DiskPartition, DiskUsage, MemoryReading, MetricsSource,
    NetworkInterface, SysinfoSource, SystemIdentity,
};

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub system: SystemIdentity,
    pub cpu_info: CpuInfo,
    pub cpu: CpuReading,
    pub memory: MemoryReading,
    pub disks: Vec<DiskEntry>,
    pub disk_io: DiskIo,
    pub network: Vec<NetworkInterface>,
}

#[derive(Debug, Serialize)]
pub struct DiskEntry {
    #[serde(flatten)]
    pub partition: DiskPartition,
    /// None when the mount point cannot be queried
    pub usage: Option<DiskUsage>,
}

pub fn execute() -> Result<()> {
    let mut source = SysinfoSource::new();
    let snapshot = collect(&mut source)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

pub fn collect(source: &mut dyn MetricsSource) -> Result<Snapshot> {
    let disks = source
        .disk_partitions()
        .context("Failed to list disk partitions")?
        .into_iter()
        .map(|partition| {
            let usage = match source.disk_usage(&partition) {
                Ok(usage) => Some(usage),
                Err(e) if e.is_permission_denied() => None,
                Err(e) => return Err(e),
            };
            Ok(DiskEntry { partition, usage })
        })
        .collect::<crate::Result<Vec<_>>>()
        .context("Failed to read disk usage")?;

    Ok(Snapshot {
        system: source.system_identity().context("Failed to read system identity")?,
        cpu_info: source.cpu_info().context("Failed to read CPU info")?,
        cpu: source.read_cpu().context("Failed to read CPU usage")?,
        memory: source.read_memory().context("Failed to read memory usage")?,
        disks,
        disk_io: source.disk_io().context("Failed to read disk I/O")?,
        network: source
            .network_interfaces()
            .context("Failed to list network interfaces")?,
    })
}
