//! Report orchestration: sample, render each enabled section, build the PDF.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use tempfile::TempDir;

use crate::core::chart::{ChartRenderer, Device};
use crate::core::document::{Align, Block, DocumentBuilder, ImageSource, PageSize};
use crate::core::metrics::{MemoryReading, MetricsSource, NetworkInterface};
use crate::core::sampler::{Categories, MetricSeries, Sampler, Samples, SamplingWindow};
use crate::error::Result;
use crate::ui::formatters::{bytes2human, center_title, format_boot_time, format_bytes};

pub const CPU_PLOT: &str = "cpu_plot.png";
pub const MEMORY_PLOT: &str = "memory_plot.png";
pub const SWAP_PLOT: &str = "swap_plot.png";

const LOGO_WIDTH_MM: f32 = 2.0 * 25.4;
const LOGO_HEIGHT_MM: f32 = 0.5 * 25.4;

/// Everything fixed at construction time
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub window: SamplingWindow,
    pub categories: Categories,
    pub output_dir: PathBuf,
    pub page_size: PageSize,
    /// Encoded logo image placed first in the document
    pub logo: Option<Vec<u8>>,
    /// Loop pause when memory is sampled without CPU
    pub tick: Duration,
}

impl ReportOptions {
    pub fn new(window: SamplingWindow, categories: Categories) -> Self {
        Self {
            window,
            categories,
            output_dir: PathBuf::from("."),
            page_size: PageSize::default(),
            logo: None,
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportState {
    Initialized,
    Sampling,
    Rendering,
    Built,
}

/// Chart images for one report, removed when dropped
pub struct ChartFiles {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl ChartFiles {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("hwreport-charts-")
            .tempdir()?;
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    /// Path for a named chart, tracked for removal
    pub fn path_for(&mut self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        self.files.push(path.clone());
        path
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Drop for ChartFiles {
    fn drop(&mut self) {
        for file in &self.files {
            match fs::remove_file(file) {
                Ok(()) => debug!("Removed {}", file.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", file.display(), e),
            }
        }
    }
}

/// Hardware report over one sampling window
///
/// Construction samples synchronously for the whole window; `generate_pdf`
/// renders the enabled sections and writes the document.
pub struct HardwareReport<S, R> {
    categories: Categories,
    source: S,
    renderer: R,
    builder: DocumentBuilder,
    generated_at: DateTime<Local>,
    logo: Option<Vec<u8>>,
    samples: Samples,
    state: ReportState,
}

impl<S: MetricsSource, R: ChartRenderer> HardwareReport<S, R> {
    pub fn new(options: ReportOptions, source: S, renderer: R) -> Result<Self> {
        let generated_at = Local::now();
        let builder =
            DocumentBuilder::create_template(&generated_at, options.page_size, &options.output_dir);

        let mut report = Self {
            categories: options.categories,
            source,
            renderer,
            builder,
            generated_at,
            logo: options.logo,
            samples: Samples::default(),
            state: ReportState::Initialized,
        };
        debug!(
            "Report state: {:?}, output {}",
            report.state,
            report.builder.output_path().display()
        );

        report.state = ReportState::Sampling;
        report.samples = Sampler::new(options.window, options.categories)
            .with_tick(options.tick)
            .run(&mut report.source)?;
        Ok(report)
    }

    pub fn state(&self) -> ReportState {
        self.state
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn output_path(&self) -> &Path {
        self.builder.output_path()
    }

    /// Render all enabled sections into an ordered content list. Charts are
    /// written into `charts`.
    pub fn compose(&mut self, charts: &mut ChartFiles) -> Result<Vec<Block>> {
        self.state = ReportState::Rendering;
        let mut parts = Vec::new();

        if let Some(logo) = &self.logo {
            parts.push(self.builder.format_image_with(
                ImageSource::Bytes(logo.clone()),
                Align::Left,
                LOGO_WIDTH_MM,
                LOGO_HEIGHT_MM,
            ));
        }
        parts.push(DocumentBuilder::format_text(&format!(
            "COMPUTER HARDWARE REPORT\nDate: {}\nTime: {}\n\n",
            self.generated_at.format("%d/%m/%Y"),
            self.generated_at.format("%H:%M:%S")
        )));

        if self.categories.system {
            self.system_section(&mut parts)?;
        }
        if self.categories.cpu {
            self.cpu_section(&mut parts, charts)?;
        }
        if self.categories.memory {
            self.memory_section(&mut parts, charts)?;
        }
        if self.categories.disk {
            self.disk_section(&mut parts)?;
        }
        if self.categories.network {
            self.network_section(&mut parts)?;
        }

        debug!("Composed {} blocks", parts.len());
        Ok(parts)
    }

    /// Render and write the report. Chart files are removed whether or not
    /// the build succeeds.
    pub fn generate_pdf(mut self) -> Result<PathBuf> {
        let mut charts = ChartFiles::new()?;
        let parts = self.compose(&mut charts)?;
        let path = self.builder.build(parts)?;
        self.state = ReportState::Built;
        info!("Report state: {:?}", self.state);
        Ok(path)
    }

    fn system_section(&mut self, parts: &mut Vec<Block>) -> Result<()> {
        let identity = self.source.system_identity()?;
        let text = format!(
            "{}\n\n\nSystem: {}\nNode Name: {}\nRelease: {}\nVersion: {}\nMachine: {}\nProcessor: {}\nBoot Time: {}\n\n",
            center_title(" System Information ", 91, '='),
            identity.system,
            identity.node_name,
            identity.release,
            identity.version,
            identity.machine,
            identity.processor,
            format_boot_time(&identity.boot_time),
        );
        parts.push(DocumentBuilder::format_text(&text));
        Ok(())
    }

    fn cpu_section(&mut self, parts: &mut Vec<Block>, charts: &mut ChartFiles) -> Result<()> {
        let info = self.source.cpu_info()?;
        let mhz = |f: Option<f64>| f.map_or_else(|| "N/A".to_string(), |f| format!("{:.2}Mhz", f));

        let mut text = format!(
            "{}\n\n\nPhysical cores: {}\nTotal cores: {}\nMax Frequency: {}\nMin Frequency: {}\nCurrent Frequency: {:.2}Mhz\nPeak CPU Usage:",
            center_title(" CPU Info ", 89, '='),
            info.physical_cores
                .map_or_else(|| "N/A".to_string(), |n| n.to_string()),
            info.logical_cores,
            mhz(info.max_frequency_mhz),
            mhz(info.min_frequency_mhz),
            info.current_frequency_mhz,
        );

        let chart = self.chart(Device::Cpu, &self.samples.cpu, charts, CPU_PLOT)?;
        if self.samples.cpu.is_empty() {
            text.push_str(" no samples collected");
        }
        for (label, peak) in self.samples.cpu.peaks() {
            text.push_str(&format!("\n\t{}: {:.1}%", label, peak));
        }

        parts.push(DocumentBuilder::format_text(&text));
        parts.extend(chart);
        parts.push(DocumentBuilder::page_break());
        Ok(())
    }

    fn memory_section(&mut self, parts: &mut Vec<Block>, charts: &mut ChartFiles) -> Result<()> {
        let snapshot = match &self.samples.memory_snapshot {
            Some(snapshot) => snapshot.clone(),
            None => self.source.read_memory()?,
        };

        parts.push(DocumentBuilder::format_text(&memory_text(&snapshot)));
        let chart = self.chart(Device::Memory, &self.samples.memory, charts, MEMORY_PLOT)?;
        parts.extend(chart);
        parts.push(DocumentBuilder::page_break());

        parts.push(DocumentBuilder::format_text(&swap_text(&snapshot)));
        let chart = self.chart(Device::Swap, &self.samples.swap, charts, SWAP_PLOT)?;
        parts.extend(chart);
        Ok(())
    }

    fn disk_section(&mut self, parts: &mut Vec<Block>) -> Result<()> {
        parts.push(DocumentBuilder::format_text(&format!(
            "{}\n\n",
            center_title(" Disk Information ", 92, '=')
        )));

        let mut rows = vec![["Device", "Mount", "Fstype", "Total", "Used", "Free", "Usage(%)"]
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()];

        for partition in self.source.disk_partitions()? {
            let usage = match self.source.disk_usage(&partition) {
                Ok(usage) => usage,
                Err(e) if e.is_permission_denied() => {
                    // e.g. a removable drive that isn't ready
                    warn!("Skipping partition {}: {}", partition.mount_point, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            rows.push(vec![
                partition.device,
                partition.mount_point,
                partition.fs_type,
                format_bytes(usage.total_bytes as f64),
                format_bytes(usage.used_bytes as f64),
                format_bytes(usage.free_bytes as f64),
                format!("{:.1}%", usage.usage_percent),
            ]);
        }
        parts.push(DocumentBuilder::format_table(rows));

        let io = self.source.disk_io()?;
        parts.push(DocumentBuilder::format_text(&format!(
            "\nTotal bytes read: {}\nTotal bytes written: {}\n",
            format_bytes(io.read_bytes as f64),
            format_bytes(io.write_bytes as f64)
        )));
        parts.push(DocumentBuilder::page_break());
        Ok(())
    }

    fn network_section(&mut self, parts: &mut Vec<Block>) -> Result<()> {
        parts.push(DocumentBuilder::format_text(&format!(
            "{}\n\n",
            center_title(" Network Information ", 92, '=')
        )));

        let rows = self
            .source
            .network_interfaces()?
            .iter()
            .flat_map(interface_rows)
            .collect();
        parts.push(DocumentBuilder::unformatted_table(rows));
        Ok(())
    }

    /// Chart block for a series, or nothing when no samples were taken
    fn chart(
        &self,
        device: Device,
        series: &MetricSeries,
        charts: &mut ChartFiles,
        file_name: &str,
    ) -> Result<Option<Block>> {
        if series.is_empty() {
            debug!("No {} samples, skipping chart", device.name());
            return Ok(None);
        }

        let path = charts.path_for(file_name);
        self.renderer
            .line_plot(device, &series.to_chart_table(), &path)?;
        Ok(Some(self.builder.format_image(path)))
    }
}

fn memory_text(m: &MemoryReading) -> String {
    format!(
        "{}\n\n\nTotal: {}\nAvailable: {}\nUsed: {}\nPercentage usage: {:.1}%\n",
        center_title(" Memory Information ", 91, '='),
        format_bytes(m.total_bytes as f64),
        format_bytes(m.available_bytes as f64),
        format_bytes(m.used_bytes as f64),
        m.usage_percent
    )
}

fn swap_text(m: &MemoryReading) -> String {
    format!(
        "{}\n\n\nTotal: {}\nFree: {}\nUsed: {}\nPercentage usage: {:.1}%\n",
        center_title(" SWAP ", 87, '='),
        format_bytes(m.swap_total_bytes as f64),
        format_bytes(m.swap_free_bytes as f64),
        format_bytes(m.swap_used_bytes as f64),
        m.swap_percent
    )
}

/// ifconfig-style rows for one interface; absent fields produce no row
fn interface_rows(nic: &NetworkInterface) -> Vec<Vec<String>> {
    let row = |key: &str, value: String| vec![String::new(), key.to_string(), value];
    let mut rows = vec![vec![format!("{}:", nic.name), String::new(), String::new()]];

    if let Some(stats) = &nic.stats {
        rows.push(row(
            "stats",
            format!(
                ": speed={}MB, duplex={}, mtu={}, up={}",
                stats.speed_mb,
                stats.duplex.label(),
                stats.mtu,
                if stats.is_up { "yes" } else { "no" }
            ),
        ));
    }

    if let Some(io) = &nic.io {
        let drops = |d: Option<u64>| d.map_or_else(|| "?".to_string(), |d| d.to_string());
        rows.push(row(
            "incoming",
            format!(
                ": bytes={}, pkts={}, errs={}, drops={}",
                bytes2human(io.bytes_recv),
                io.packets_recv,
                io.errin,
                drops(io.dropin)
            ),
        ));
        rows.push(row(
            "outgoing",
            format!(
                ": bytes={}, pkts={}, errs={}, drops={}",
                bytes2human(io.bytes_sent),
                io.packets_sent,
                io.errout,
                drops(io.dropout)
            ),
        ));
    }

    for addr in &nic.addresses {
        rows.push(row(
            &format!("{:4} address", addr.family.label()),
            format!(": {}", addr.address),
        ));
        if let Some(broadcast) = &addr.broadcast {
            rows.push(row("        broadcast", format!(": {}", broadcast)));
        }
        if let Some(netmask) = &addr.netmask {
            rows.push(row("        netmask", format!(": {}", netmask)));
        }
        if let Some(ptp) = &addr.ptp {
            rows.push(row("        p2p", format!(": {}", ptp)));
        }
    }

    rows
}
