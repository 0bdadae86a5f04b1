//! `hwreport report`: sample over a window and write the PDF.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, NaiveTime, TimeDelta};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::chart::PlottersRenderer;
use crate::core::document::{fetch_logo, PageSize};
use crate::core::metrics::SysinfoSource;
use crate::core::report::{HardwareReport, ReportOptions};
use crate::core::sampler::{Categories, SamplingWindow};
use crate::core::Config;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let options = report_options(matches, &config, Local::now())?;

    println!(
        "{} {} → {}",
        "Sampling:".white().bold(),
        options.window.start.format("%H:%M:%S"),
        options.window.stop.format("%H:%M:%S")
    );

    let source = SysinfoSource::with_cpu_interval(config.sample_interval());
    let report = HardwareReport::new(options, source, PlottersRenderer)
        .context("Failed to sample hardware metrics")?;
    let path = report
        .generate_pdf()
        .context("Failed to generate hardware report")?;

    println!("{} {}", "Report written:".green().bold(), path.display());
    Ok(())
}

/// Resolve flags over config defaults
fn report_options(
    matches: &ArgMatches,
    config: &Config,
    now: DateTime<Local>,
) -> Result<ReportOptions> {
    let start = match matches.get_one::<String>("start") {
        Some(s) => parse_time(s, now)?,
        None => now,
    };
    let stop = match matches.get_one::<String>("stop") {
        Some(s) => parse_time(s, now)?,
        None => {
            let duration = matches
                .get_one::<u64>("duration")
                .map(|secs| Duration::from_secs(*secs))
                .unwrap_or_else(|| config.default_duration());
            start + TimeDelta::from_std(duration).context("Duration out of range")?
        }
    };

    let categories = Categories {
        system: !matches.get_flag("no-system"),
        cpu: !matches.get_flag("no-cpu"),
        memory: !matches.get_flag("no-memory"),
        disk: !matches.get_flag("no-disk"),
        network: !matches.get_flag("no-network"),
    };

    let output_dir = matches
        .get_one::<String>("output-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_dir());
    if !output_dir.is_dir() {
        bail!("Output directory does not exist: {}", output_dir.display());
    }

    let page_size = match matches.get_one::<String>("page-size") {
        Some(s) => s.parse::<PageSize>()?,
        None => config.page_size,
    };

    let logo = if matches.get_flag("no-logo") {
        None
    } else {
        let url = matches
            .get_one::<String>("logo-url")
            .map(String::as_str)
            .unwrap_or(&config.logo_url);
        fetch_logo(url).map(<[u8]>::to_vec)
    };

    Ok(ReportOptions {
        window: SamplingWindow::new(start, stop),
        categories,
        output_dir,
        page_size,
        logo,
        tick: config.sample_interval(),
    })
}

/// RFC 3339 timestamp, or a wall-clock time today (`HH:MM` or `HH:MM:SS`)
pub fn parse_time(value: &str, now: DateTime<Local>) -> Result<DateTime<Local>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Local));
    }

    let time = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            anyhow!(
                "Invalid time '{}' (expected RFC 3339, HH:MM or HH:MM:SS)",
                value
            )
        })?;

    now.date_naive()
        .and_time(time)
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("Time '{}' does not exist today in the local timezone", value))
}
