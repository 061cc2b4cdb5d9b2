use std::path::PathBuf;

use crate::cli::{Cli, StatsFormat};
use crate::formatters::SpeedPrecision;
use crate::parallel::{ParallelConfig, DEFAULT_LANE_CAPACITY};

/// Main configuration struct for edgespeed
#[derive(Debug, Clone)]
pub struct EdgeSpeedConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub performance: PerformanceConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub mapping: PathBuf,
    pub speeds: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub precision: SpeedPrecision,
    pub stats_format: StatsFormat,
    pub quiet: bool,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    pub threads: usize,
    pub lane_capacity: usize,
    pub output_buffer: Option<usize>,
}

impl EdgeSpeedConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            input: InputConfig {
                mapping: PathBuf::from(&cli.mapping),
                speeds: PathBuf::from(&cli.speeds),
            },
            output: OutputConfig {
                path: PathBuf::from(&cli.output),
                precision: cli.precision(),
                stats_format: cli.stats_format,
                quiet: cli.quiet,
            },
            performance: PerformanceConfig {
                threads: cli.threads,
                lane_capacity: cli.lane_capacity,
                output_buffer: cli.output_buffer,
            },
        }
    }

    /// Get effective thread count with defaults
    pub fn effective_threads(&self) -> usize {
        if self.performance.threads == 0 {
            num_cpus::get()
        } else {
            self.performance.threads
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        let workers = self.effective_threads();
        let config = ParallelConfig::default()
            .with_workers(workers)
            .with_lane_capacity(self.performance.lane_capacity);
        match self.performance.output_buffer {
            Some(buffer) => config.with_output_buffer(buffer),
            None => config.with_output_buffer(workers.saturating_mul(4)),
        }
    }
}

impl Default for EdgeSpeedConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                mapping: PathBuf::new(),
                speeds: PathBuf::new(),
            },
            output: OutputConfig {
                path: PathBuf::from("traffic.csv"),
                precision: SpeedPrecision::Integer,
                stats_format: StatsFormat::Text,
                quiet: false,
            },
            performance: PerformanceConfig {
                threads: 0,
                lane_capacity: DEFAULT_LANE_CAPACITY,
                output_buffer: None,
            },
        }
    }
}
