use std::fs;
use std::time::Duration;

use chrono::{Duration as TimeDelta, Local};
use hwreport::core::document::{Align, Block};
use hwreport::core::report::{ChartFiles, HardwareReport, ReportOptions, ReportState};
use hwreport::core::sampler::{Categories, SamplingWindow};
use tempfile::TempDir;

use super::support::{FakeSource, StubRenderer};

fn only(apply: impl FnOnce(&mut Categories)) -> Categories {
    let mut categories = Categories::none();
    apply(&mut categories);
    categories
}

fn options(window: SamplingWindow, categories: Categories, dir: &TempDir) -> ReportOptions {
    ReportOptions {
        output_dir: dir.path().to_path_buf(),
        tick: Duration::from_millis(50),
        ..ReportOptions::new(window, categories)
    }
}

fn empty_window() -> SamplingWindow {
    let now = Local::now();
    SamplingWindow::new(now, now - TimeDelta::seconds(1))
}

fn texts(blocks: &[Block]) -> Vec<String> {
    blocks.iter().filter_map(Block::text).collect()
}

#[test]
fn test_cpu_only_report() {
    let dir = TempDir::new().unwrap();
    let window = SamplingWindow::starting_now(Duration::from_secs(3));
    let source = FakeSource::new(Duration::from_millis(250));
    let mut report =
        HardwareReport::new(options(window, only(|c| c.cpu = true), &dir), source, StubRenderer)
            .unwrap();

    assert_eq!(report.state(), ReportState::Sampling);
    let samples = report.samples().cpu.len();
    assert!((10..=13).contains(&samples), "got {} samples", samples);
    assert!(report.samples().memory.is_empty());

    let mut charts = ChartFiles::new().unwrap();
    let blocks = report.compose(&mut charts).unwrap();
    assert_eq!(report.state(), ReportState::Rendering);

    let texts = texts(&blocks);
    assert_eq!(
        texts.iter().filter(|t| t.contains("Physical cores: 4")).count(),
        1
    );
    assert!(texts.iter().any(|t| t.contains("Max Frequency: 4200.00Mhz")));
    assert!(texts.iter().any(|t| t.contains("Min Frequency: N/A")));
    assert!(texts.iter().any(|t| t.contains("Core_3: 95.0%")));
    assert_eq!(blocks.iter().filter(|b| b.is_image()).count(), 1);
    assert!(!blocks.iter().any(|b| b.is_table()));
    assert!(!texts
        .iter()
        .any(|t| t.contains("Memory Information") || t.contains("System Information")));

    let chart = charts.files()[0].clone();
    assert!(chart.ends_with("cpu_plot.png"));
    assert!(chart.exists());
    drop(charts);
    assert!(!chart.exists());
}

#[test]
fn test_empty_window_still_builds_without_charts() {
    let dir = TempDir::new().unwrap();
    let mut report = HardwareReport::new(
        options(empty_window(), Categories::all(), &dir),
        FakeSource::new(Duration::from_millis(10)),
        StubRenderer,
    )
    .unwrap();
    assert!(report.samples().cpu.is_empty());
    assert!(report.samples().memory.is_empty());

    let mut charts = ChartFiles::new().unwrap();
    let blocks = report.compose(&mut charts).unwrap();
    assert!(!blocks.iter().any(|b| b.is_image()));
    assert!(charts.files().is_empty());

    let texts = texts(&blocks);
    assert!(texts.iter().any(|t| t.contains("System: Linux")));
    assert!(texts.iter().any(|t| t.contains("Boot Time: 2022/8/1 9:5:3")));
    assert!(texts.iter().any(|t| t.contains("Available: 10.00GB")));
    assert!(texts.iter().any(|t| t.contains("SWAP")));
    drop(charts);

    let path = report.generate_pdf().unwrap();
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_permission_denied_partition_is_skipped() {
    let dir = TempDir::new().unwrap();
    let mut report = HardwareReport::new(
        options(empty_window(), only(|c| c.disk = true), &dir),
        FakeSource::new(Duration::ZERO),
        StubRenderer,
    )
    .unwrap();

    let mut charts = ChartFiles::new().unwrap();
    let blocks = report.compose(&mut charts).unwrap();
    let rows = blocks
        .iter()
        .find_map(|b| match b {
            Block::Table { rows, .. } => Some(rows.clone()),
            _ => None,
        })
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Device");
    assert_eq!(rows[0][6], "Usage(%)");
    assert_eq!(rows[1][0], "/dev/sda1");
    assert_eq!(rows[1][3], "100.00GB");
    assert_eq!(rows[1][6], "60.0%");
    assert!(!rows.iter().any(|row| row[0] == "/dev/sr0"));
    assert!(texts(&blocks)
        .iter()
        .any(|t| t.contains("Total bytes read: 3.00GB")));
    assert!(matches!(blocks.last(), Some(Block::PageBreak)));
}

#[test]
fn test_memory_section_has_memory_and_swap_charts() {
    let dir = TempDir::new().unwrap();
    let window = SamplingWindow::starting_now(Duration::from_millis(400));
    let mut report = HardwareReport::new(
        options(window, only(|c| c.memory = true), &dir),
        FakeSource::new(Duration::ZERO),
        StubRenderer,
    )
    .unwrap();

    let samples = report.samples();
    assert!(!samples.memory.is_empty());
    assert_eq!(samples.memory.len(), samples.swap.len());
    let labels: Vec<&str> = samples.swap.labels().collect();
    assert_eq!(labels, ["Total", "Free", "Used", "Percentage_usage"]);

    let mut charts = ChartFiles::new().unwrap();
    let blocks = report.compose(&mut charts).unwrap();
    assert_eq!(blocks.iter().filter(|b| b.is_image()).count(), 2);
    assert_eq!(charts.files().len(), 2);
}

#[test]
fn test_network_listing() {
    let dir = TempDir::new().unwrap();
    let mut report = HardwareReport::new(
        options(empty_window(), only(|c| c.network = true), &dir),
        FakeSource::new(Duration::ZERO),
        StubRenderer,
    )
    .unwrap();

    let mut charts = ChartFiles::new().unwrap();
    let blocks = report.compose(&mut charts).unwrap();
    let rows = match blocks.last() {
        Some(Block::Table { rows, .. }) => rows.clone(),
        other => panic!("expected network table, got {:?}", other),
    };

    assert_eq!(rows[0], ["eth0:", "", ""]);
    assert_eq!(rows[1][2], ": speed=1000MB, duplex=full, mtu=1500, up=yes");
    assert_eq!(rows[2][2], ": bytes=2.0M, pkts=1200, errs=0, drops=?");
    assert_eq!(rows[4][2], ": 192.168.1.10");
    assert_eq!(rows.len(), 7);
}

#[test]
fn test_logo_is_placed_first() {
    let dir = TempDir::new().unwrap();
    let mut logo = Vec::new();
    image::RgbImage::new(8, 2)
        .write_to(
            &mut std::io::Cursor::new(&mut logo),
            image::ImageOutputFormat::Png,
        )
        .unwrap();

    let mut opts = options(empty_window(), Categories::none(), &dir);
    opts.logo = Some(logo);
    let mut report =
        HardwareReport::new(opts, FakeSource::new(Duration::ZERO), StubRenderer).unwrap();

    let mut charts = ChartFiles::new().unwrap();
    let blocks = report.compose(&mut charts).unwrap();
    assert!(matches!(
        blocks[0],
        Block::Image {
            align: Align::Left,
            ..
        }
    ));
    assert!(blocks[1]
        .text()
        .unwrap()
        .starts_with("COMPUTER HARDWARE REPORT\nDate: "));
}

#[test]
fn test_source_failure_leaves_no_pdf() {
    let dir = TempDir::new().unwrap();
    let mut source = FakeSource::new(Duration::ZERO);
    source.fail_identity = true;
    let report = HardwareReport::new(
        options(empty_window(), Categories::all(), &dir),
        source,
        StubRenderer,
    )
    .unwrap();

    let err = report.generate_pdf().unwrap_err();
    assert!(err.to_string().contains("identity unavailable"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
