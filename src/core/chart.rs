//! Two-panel usage charts rendered with plotters.

use std::path::Path;

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbImage};
use log::debug;
use plotters::prelude::*;

use crate::error::{ReportError, Result};

const CHART_WIDTH_PX: u32 = 1200;
const CHART_HEIGHT_PX: u32 = 800;

/// Per-item series plus a trailing aggregate column, indexed by timestamp
#[derive(Debug, Clone, Default)]
pub struct ChartTable {
    pub timestamps: Vec<DateTime<Local>>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl ChartTable {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty() || self.columns.is_empty()
    }

    /// All columns but the last
    pub fn items(&self) -> &[(String, Vec<f64>)] {
        match self.columns.split_last() {
            Some((_, items)) => items,
            None => &[],
        }
    }

    pub fn aggregate(&self) -> Option<&(String, Vec<f64>)> {
        self.columns.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Memory,
    Swap,
}

impl Device {
    pub fn name(&self) -> &'static str {
        match self {
            Device::Cpu => "CPU",
            Device::Memory => "Memory",
            Device::Swap => "Swap",
        }
    }

    /// Fixed 0–100 range for the top panel, or `None` to fit the data
    fn top_range(&self) -> Option<(f64, f64)> {
        match self {
            Device::Cpu => Some((0.0, 100.0)),
            Device::Memory | Device::Swap => None,
        }
    }

    fn top_unit(&self) -> &'static str {
        match self {
            Device::Cpu => "%",
            Device::Memory | Device::Swap => "GB",
        }
    }
}

/// Renders a [`ChartTable`] to an image file
pub trait ChartRenderer {
    fn line_plot(&self, device: Device, table: &ChartTable, path: &Path) -> Result<()>;
}

struct ChartStyle;

impl ChartStyle {
    const MARGIN: i32 = 16;
    const TITLE_FONT: (&'static str, i32) = ("serif", 32);
    const CAPTION_FONT: (&'static str, i32) = ("sans-serif", 22);
    const X_LABEL_AREA_SIZE: u32 = 60;
    const Y_LABEL_AREA_SIZE: u32 = 60;
    const X_LABEL_COUNT: usize = 8;
    const Y_LABEL_COUNT: usize = 6;
    const FILL_ALPHA: f64 = 0.2;
    const BACKGROUND: RGBColor = WHITE;
}

/// [`ChartRenderer`] drawing into an RGB buffer and saving it as PNG
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

impl ChartRenderer for PlottersRenderer {
    fn line_plot(&self, device: Device, table: &ChartTable, path: &Path) -> Result<()> {
        let (width, height) = (CHART_WIDTH_PX, CHART_HEIGHT_PX);
        let mut rgb_buffer = vec![255u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut rgb_buffer, (width, height))
                .into_drawing_area();
            root.fill(&ChartStyle::BACKGROUND)
                .map_err(|e| ReportError::chart(format!("background fill error: {:?}", e)))?;

            let root = root
                .titled(
                    &format!("{} Usage vs Time", device.name()),
                    ChartStyle::TITLE_FONT.into_font().style(FontStyle::Bold),
                )
                .map_err(|e| ReportError::chart(format!("title error: {:?}", e)))?;
            let panels = root.split_evenly((2, 1));

            let (x_start, x_end) = time_range(&table.timestamps);

            // Top: every per-item series
            let (y_min, y_max) = device
                .top_range()
                .unwrap_or_else(|| value_range(table.items()));
            let mut top = ChartBuilder::on(&panels[0])
                .margin(ChartStyle::MARGIN)
                .caption(format!("{} Usage", device.name()), ChartStyle::CAPTION_FONT)
                .x_label_area_size(ChartStyle::X_LABEL_AREA_SIZE)
                .y_label_area_size(ChartStyle::Y_LABEL_AREA_SIZE)
                .build_cartesian_2d(x_start..x_end, y_min..y_max)
                .map_err(|e| ReportError::chart(format!("chart build error: {:?}", e)))?;

            top.configure_mesh()
                .x_labels(ChartStyle::X_LABEL_COUNT)
                .y_labels(ChartStyle::Y_LABEL_COUNT)
                .x_label_formatter(&|t: &DateTime<Local>| t.format("%H:%M:%S").to_string())
                .x_desc("Datetime")
                .y_desc(format!("{} ({})", device.name(), device.top_unit()))
                .draw()
                .map_err(|e| ReportError::chart(format!("mesh draw error: {:?}", e)))?;

            for (i, (label, values)) in table.items().iter().enumerate() {
                let color = Palette99::pick(i).to_rgba();
                top.draw_series(LineSeries::new(
                    table.timestamps.iter().copied().zip(values.iter().copied()),
                    color.stroke_width(2),
                ))
                .map_err(|e| ReportError::chart(format!("series draw error: {:?}", e)))?
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }

            if !table.items().is_empty() {
                top.configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(|e| ReportError::chart(format!("legend draw error: {:?}", e)))?;
            }

            // Bottom: aggregate series with its area filled down to zero
            let mut bottom = ChartBuilder::on(&panels[1])
                .margin(ChartStyle::MARGIN)
                .caption(format!("Total {} Usage", device.name()), ChartStyle::CAPTION_FONT)
                .x_label_area_size(ChartStyle::X_LABEL_AREA_SIZE)
                .y_label_area_size(ChartStyle::Y_LABEL_AREA_SIZE)
                .build_cartesian_2d(x_start..x_end, 0.0..100.0)
                .map_err(|e| ReportError::chart(format!("chart build error: {:?}", e)))?;

            bottom
                .configure_mesh()
                .x_labels(ChartStyle::X_LABEL_COUNT)
                .y_labels(ChartStyle::Y_LABEL_COUNT)
                .x_label_formatter(&|t: &DateTime<Local>| t.format("%H:%M:%S").to_string())
                .x_desc("Datetime")
                .y_desc(format!("{} (%)", device.name()))
                .draw()
                .map_err(|e| ReportError::chart(format!("mesh draw error: {:?}", e)))?;

            if let Some((_, values)) = table.aggregate() {
                let color = Palette99::pick(0).to_rgba();
                bottom
                    .draw_series(
                        AreaSeries::new(
                            table.timestamps.iter().copied().zip(values.iter().copied()),
                            0.0,
                            color.mix(ChartStyle::FILL_ALPHA),
                        )
                        .border_style(color.stroke_width(2)),
                    )
                    .map_err(|e| ReportError::chart(format!("series draw error: {:?}", e)))?
                    .label(format!("Total {}", device.name()))
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

                bottom
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(|e| ReportError::chart(format!("legend draw error: {:?}", e)))?;
            }

            root.present()
                .map_err(|e| ReportError::chart(format!("present error: {:?}", e)))?;
        }

        let image = RgbImage::from_raw(width, height, rgb_buffer)
            .ok_or_else(|| ReportError::chart("image buffer conversion failed"))?;
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| ReportError::chart(format!("png encoding error: {}", e)))?;

        debug!("Wrote {} chart to {}", device.name(), path.display());
        Ok(())
    }
}

/// Time axis bounds; a single instant (or none) is widened to two seconds
fn time_range(timestamps: &[DateTime<Local>]) -> (DateTime<Local>, DateTime<Local>) {
    let now = Local::now();
    let mut start = timestamps.first().copied().unwrap_or(now);
    let mut end = timestamps.last().copied().unwrap_or(now);
    if start == end {
        start -= chrono::Duration::seconds(1);
        end += chrono::Duration::seconds(1);
    }
    (start, end)
}

/// Value axis bounds fitted to the data with 10% headroom
fn value_range(columns: &[(String, Vec<f64>)]) -> (f64, f64) {
    let values = columns.iter().flat_map(|(_, c)| c.iter().copied());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let span = max - min;
    if span <= f64::EPSILON {
        return ((min - 1.0).min(0.0), max + 1.0);
    }
    ((min - span * 0.1).max(0.0), max + span * 0.1)
}
