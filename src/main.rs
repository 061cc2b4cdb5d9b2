use anyhow::Result;
use clap::Parser;

use edgespeed::cli::{Cli, StatsFormat};
use edgespeed::config::EdgeSpeedConfig;
use edgespeed::config_file::ConfigFile;
use edgespeed::platform::ExitCode;
use edgespeed::runner;
use edgespeed::stats::PipelineSummary;

fn main() {
    let cli = process_args_with_config();
    init_logging(&cli);

    let config = EdgeSpeedConfig::from_cli(&cli);
    log::debug!("configuration: {:?}", config);

    match runner::run(&config) {
        Ok(summary) => {
            if !config.output.quiet {
                report(&summary, config.output.stats_format);
            }
            ExitCode::Success.exit();
        }
        Err(e) => {
            eprintln!("edgespeed: Error: {:#}", e);
            ExitCode::GeneralError.exit();
        }
    }
}

/// Route `log` records to stderr; RUST_LOG overrides -v/-q
fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(cli.log_level())
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn report(summary: &PipelineSummary, format: StatsFormat) {
    match format {
        StatsFormat::Text => eprintln!("{}", summary.format_stats()),
        StatsFormat::Json => eprintln!("{}", summary.format_json()),
    }
}

/// Extract --config-file argument from raw args
fn extract_config_file_arg(args: &[String]) -> Option<String> {
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == "--config-file" {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix("--config-file=").map(str::to_string)
        }
    })
}

fn expand_args(raw_args: Vec<String>) -> Result<Vec<String>> {
    if raw_args.iter().any(|arg| arg == "--ignore-config") {
        return Ok(raw_args);
    }
    let config_file_path = extract_config_file_arg(&raw_args);
    let config_file = ConfigFile::load_with_custom_path(config_file_path.as_deref())?;
    config_file.process_args(raw_args)
}

fn process_args_with_config() -> Cli {
    let raw_args: Vec<String> = std::env::args().collect();

    let processed_args = match expand_args(raw_args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("edgespeed: Config error: {:#}", e);
            ExitCode::InvalidUsage.exit();
        }
    };

    // clap prints usage and exits with status 2 on invalid arguments
    let cli = Cli::parse_from(processed_args);

    // Aliases are expanded before parsing, so any left here were never resolved
    if !cli.alias.is_empty() {
        eprintln!(
            "edgespeed: Error: alias '{}' cannot be expanded with --ignore-config",
            cli.alias.join("', '")
        );
        ExitCode::InvalidUsage.exit();
    }

    cli
}
