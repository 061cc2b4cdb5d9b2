// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::Parser;

use crate::formatters::SpeedPrecision;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsFormat {
    #[default]
    Text,
    Json,
}

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "edgespeed")]
#[command(about = "Expand per-way traffic speeds into per-edge speed records")]
#[command(
    long_about = "Expand per-way traffic speeds into per-edge speed records\n\nReads a way-to-nodes mapping (one `wayId,node,node,...` line per way, optionally gzip or zstd compressed) and a speed table keyed by signed way id, and writes one `fromNode,toNode,speed` line per directed edge of every matched way.\n\nCOMMON EXAMPLES:\n  edgespeed -m ways.csv.gz -s speeds.csv\n  edgespeed -m ways.csv -s speeds.csv -o traffic.csv -j 8 --high-precision\n  edgespeed -m ways.csv -s speeds.csv --stats-format json"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Way-to-nodes mapping file (gzip and zstd are detected automatically)
    #[arg(short = 'm', long = "mapping", help_heading = "Input Options")]
    pub mapping: String,

    /// Speed table as CSV rows `wayId,speed` or `wayId,speed,direction`
    #[arg(short = 's', long = "speeds", help_heading = "Input Options")]
    pub speeds: String,

    /// Output file, created or truncated
    #[arg(
        short = 'o',
        long = "output",
        default_value = "traffic.csv",
        help_heading = "Output Options"
    )]
    pub output: String,

    /// Write speeds with six decimals instead of truncated integers
    #[arg(long = "high-precision", help_heading = "Output Options")]
    pub high_precision: bool,

    /// Format of the statistics report written to stderr
    #[arg(
        long = "stats-format",
        value_enum,
        default_value = "text",
        help_heading = "Output Options"
    )]
    pub stats_format: StatsFormat,

    /// Number of worker threads (0 = one per CPU)
    #[arg(
        short = 'j',
        long = "threads",
        default_value_t = 0,
        help_heading = "Performance Options"
    )]
    pub threads: usize,

    /// Lines buffered per worker lane
    #[arg(
        long = "lane-capacity",
        default_value_t = crate::parallel::DEFAULT_LANE_CAPACITY,
        help_heading = "Performance Options"
    )]
    pub lane_capacity: usize,

    /// Record batches buffered ahead of the writer (default: threads * 4)
    #[arg(long = "output-buffer", help_heading = "Performance Options")]
    pub output_buffer: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Logging")]
    pub verbose: u8,

    /// Only log errors and suppress the statistics report
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help_heading = "Logging"
    )]
    pub quiet: bool,

    /// Read defaults and aliases from this file instead of the search path
    #[arg(long = "config-file", help_heading = "Configuration")]
    pub config_file: Option<String>,

    /// Ignore configuration files
    #[arg(long = "ignore-config", help_heading = "Configuration")]
    pub ignore_config: bool,

    /// Expand a named argument bundle from the configuration file
    #[arg(short = 'a', long = "alias", help_heading = "Configuration")]
    pub alias: Vec<String>,
}

impl Cli {
    pub fn precision(&self) -> SpeedPrecision {
        if self.high_precision {
            SpeedPrecision::Decimal
        } else {
            SpeedPrecision::Integer
        }
    }

    /// Log filter implied by -v/-q when RUST_LOG is unset
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}
