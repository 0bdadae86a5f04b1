//! Windowed accumulation of CPU and memory readings.

use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info};

use crate::core::chart::ChartTable;
use crate::core::metrics::{MemoryReading, MetricsSource};
use crate::error::Result;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// The `[start, stop)` interval during which metrics are polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingWindow {
    pub start: DateTime<Local>,
    pub stop: DateTime<Local>,
}

impl SamplingWindow {
    pub fn new(start: DateTime<Local>, stop: DateTime<Local>) -> Self {
        Self { start, stop }
    }

    /// Window opening now and lasting `duration`
    pub fn starting_now(duration: Duration) -> Self {
        let start = Local::now();
        let stop = start + chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        Self { start, stop }
    }

    pub fn contains(&self, t: DateTime<Local>) -> bool {
        self.start < t && t < self.stop
    }

    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }
}

/// Which report sections are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categories {
    pub system: bool,
    pub cpu: bool,
    pub memory: bool,
    pub disk: bool,
    pub network: bool,
}

impl Categories {
    pub fn all() -> Self {
        Self {
            system: true,
            cpu: true,
            memory: true,
            disk: true,
            network: true,
        }
    }

    pub fn none() -> Self {
        Self {
            system: false,
            cpu: false,
            memory: false,
            disk: false,
            network: false,
        }
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::all()
    }
}

/// Named series sharing one timestamp axis. Labels keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct MetricSeries {
    timestamps: Vec<DateTime<Local>>,
    columns: Vec<(String, Vec<f64>)>,
}

impl MetricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tick. `values` must name the same labels on every call.
    pub fn push_tick<S: AsRef<str>>(&mut self, at: DateTime<Local>, values: &[(S, f64)]) {
        for (label, value) in values {
            let label = label.as_ref();
            match self.columns.iter_mut().find(|(l, _)| l == label) {
                Some((_, column)) => column.push(*value),
                None => self.columns.push((label.to_string(), vec![*value])),
            }
        }
        self.timestamps.push(at);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Local>] {
        &self.timestamps
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(l, _)| l.as_str())
    }

    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_slice())
    }

    /// Highest reading per column, in column order
    pub fn peaks(&self) -> Vec<(&str, f64)> {
        self.columns
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(l, c)| (l.as_str(), c.iter().copied().fold(f64::MIN, f64::max)))
            .collect()
    }

    pub fn to_chart_table(&self) -> ChartTable {
        ChartTable {
            timestamps: self.timestamps.clone(),
            columns: self.columns.clone(),
        }
    }
}

/// Everything accumulated over one sampling window
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub cpu: MetricSeries,
    pub memory: MetricSeries,
    pub swap: MetricSeries,
    /// Reading taken before the window opened, used for section text
    pub memory_snapshot: Option<MemoryReading>,
}

/// Polls the metrics source at a fixed cadence inside a window
pub struct Sampler {
    window: SamplingWindow,
    categories: Categories,
    tick: Duration,
}

impl Sampler {
    pub fn new(window: SamplingWindow, categories: Categories) -> Self {
        Self {
            window,
            categories,
            tick: Duration::from_secs(1),
        }
    }

    /// Pause between ticks when no CPU reading paces the loop
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn run(&self, source: &mut dyn MetricsSource) -> Result<Samples> {
        let mut samples = Samples::default();
        if self.categories.memory {
            samples.memory_snapshot = Some(source.read_memory()?);
        }

        if !self.categories.cpu && !self.categories.memory {
            return Ok(samples);
        }

        self.wait_for_start();

        info!(
            "Sampling from {} to {}",
            self.window.start.format("%H:%M:%S"),
            self.window.stop.format("%H:%M:%S")
        );

        let mut now = Local::now();
        while self.window.contains(now) {
            if self.categories.cpu {
                let reading = source.read_cpu()?;
                let mut values: Vec<(String, f64)> = reading
                    .per_core_percent
                    .iter()
                    .enumerate()
                    .map(|(i, pct)| (format!("Core_{}", i), *pct))
                    .collect();
                values.push(("Total".to_string(), reading.total_percent));
                samples.cpu.push_tick(now, &values);
            } else {
                std::thread::sleep(self.tick);
            }

            if self.categories.memory {
                let reading = source.read_memory()?;
                push_memory_tick(&mut samples, now, &reading);
            }

            debug!(
                "Tick {}: cpu={} memory={}",
                now.format("%H:%M:%S"),
                samples.cpu.len(),
                samples.memory.len()
            );
            now = Local::now();
        }

        info!(
            "Sampling finished: {} cpu samples, {} memory samples",
            samples.cpu.len(),
            samples.memory.len()
        );
        Ok(samples)
    }

    fn wait_for_start(&self) {
        if self.window.is_empty() {
            return;
        }
        if let Ok(delay) = (self.window.start - Local::now()).to_std() {
            info!("Waiting {:.1}s for the sampling window to open", delay.as_secs_f64());
            // Land just past `start` so the first tick falls inside the window
            std::thread::sleep(delay + Duration::from_millis(1));
        }
    }
}

fn push_memory_tick(samples: &mut Samples, at: DateTime<Local>, reading: &MemoryReading) {
    samples.memory.push_tick(
        at,
        &[
            ("Total", to_gb(reading.total_bytes)),
            ("Available", to_gb(reading.available_bytes)),
            ("Used", to_gb(reading.used_bytes)),
            ("Percentage_usage", reading.usage_percent),
        ],
    );
    samples.swap.push_tick(
        at,
        &[
            ("Total", to_gb(reading.swap_total_bytes)),
            ("Free", to_gb(reading.swap_free_bytes)),
            ("Used", to_gb(reading.swap_used_bytes)),
            ("Percentage_usage", reading.swap_percent),
        ],
    );
}

fn to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}
