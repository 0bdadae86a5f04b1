use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use hwreport::commands;
use hwreport::core::Config;

fn main() -> Result<()> {
    hwreport::init_logging();

    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("report", sub_matches)) => commands::report(sub_matches)?,
        Some(("snapshot", _)) => commands::snapshot()?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        Some(("version", _)) => commands::version()?,
        _ => {
            println!("Use 'hwreport --help' for more information.");
        }
    }

    Ok(())
}

fn skip_flag(name: &'static str, section: &str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(format!("Leave the {} section out of the report", section))
        .action(ArgAction::SetTrue)
}

fn build_cli() -> Command {
    Command::new("hwreport")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sample CPU and memory usage over a time window and write a PDF hardware report")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("report")
                .about("Sample metrics and write a PDF report")
                .arg(
                    Arg::new("duration")
                        .short('d')
                        .long("duration")
                        .value_name("SECS")
                        .help("Window length in seconds (default from config)")
                        .value_parser(clap::value_parser!(u64))
                        .conflicts_with("stop"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_name("TIME")
                        .help("Window start, RFC 3339 or HH:MM[:SS] today (default: now)"),
                )
                .arg(
                    Arg::new("stop")
                        .long("stop")
                        .value_name("TIME")
                        .help("Window end, RFC 3339 or HH:MM[:SS] today"),
                )
                .arg(skip_flag("no-system", "system"))
                .arg(skip_flag("no-cpu", "CPU"))
                .arg(skip_flag("no-memory", "memory"))
                .arg(skip_flag("no-disk", "disk"))
                .arg(skip_flag("no-network", "network"))
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Directory the PDF is written to"),
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .value_name("SIZE")
                        .value_parser(["a4", "letter"])
                        .help("Page size"),
                )
                .arg(
                    Arg::new("logo-url")
                        .long("logo-url")
                        .value_name("URL")
                        .help("Logo image placed at the top of the report")
                        .conflicts_with("no-logo"),
                )
                .arg(
                    Arg::new("no-logo")
                        .long("no-logo")
                        .help("Do not download or place a logo")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("snapshot").about("Print live system metrics as JSON"))
        .subcommand(
            Command::new("config")
                .about("Show or change persisted defaults")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show current configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Set a configuration value")
                        .arg(
                            Arg::new("key")
                                .help("Configuration key")
                                .required(true)
                                .value_parser(Config::KEYS)
                                .index(1),
                        )
                        .arg(
                            Arg::new("value")
                                .help("New value")
                                .required(true)
                                .index(2),
                        ),
                )
                .subcommand(Command::new("reset").about("Restore default configuration")),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}
