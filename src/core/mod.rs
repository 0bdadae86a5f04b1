// Core business logic module

pub mod chart;
pub mod config;
pub mod document;
pub mod metrics;
pub mod report;
pub mod sampler;

// Re-export commonly used items
pub use chart::{ChartRenderer, PlottersRenderer};
pub use config::Config;
pub use document::{Block, DocumentBuilder};
pub use metrics::{MetricsSource, SysinfoSource};
pub use report::{ChartFiles, HardwareReport, ReportOptions, ReportState};
pub use sampler::{Categories, Sampler, SamplingWindow};
