use crate::core::Config;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("set", sub_matches)) => set(sub_matches),
        Some(("reset", _)) => reset(),
        _ => {
            println!("Use 'hwreport config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let path = Config::get_config_path()?;

    println!("{} {}", "Config file:".white().bold(), path.display());
    println!();
    println!(
        "  {:<24}{}",
        "default_duration_secs",
        config.default_duration_secs.to_string().cyan()
    );
    println!(
        "  {:<24}{}",
        "sample_interval_ms",
        config.sample_interval_ms.to_string().cyan()
    );
    match &config.output_dir {
        Some(dir) => println!("  {:<24}{}", "output_dir", dir.cyan()),
        None => println!("  {:<24}{}", "output_dir", "(working directory)".dimmed()),
    }
    println!("  {:<24}{}", "logo_url", config.logo_url.cyan());
    println!(
        "  {:<24}{}",
        "page_size",
        config.page_size.to_string().cyan()
    );
    Ok(())
}

fn set(matches: &clap::ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load().context("Failed to load configuration")?;
    config.set(key, value)?;
    config.save().context("Failed to save configuration")?;

    println!("{} {} = {}", "✓ Set".green(), key, value);
    Ok(())
}

fn reset() -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    config.reset_to_defaults();
    config.save().context("Failed to save configuration")?;

    println!("{}", "✓ Configuration reset to defaults".green());
    Ok(())
}
