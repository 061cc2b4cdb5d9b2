// Core library for the edgespeed way-to-edge speed expander

pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod formatters;
pub mod parallel;
pub mod parsers;
pub mod platform;
pub mod runner;
pub mod speed_table;
pub mod stats;
pub mod way;

pub use cli::{Cli, StatsFormat};
pub use config::EdgeSpeedConfig;
pub use formatters::{EdgeFormatter, SpeedPrecision};
pub use parsers::{ParseError, WayNodesParser};
pub use runner::{run, run_dump};
pub use speed_table::{CsvSpeedSource, SpeedLoad, SpeedSource, SpeedTable, WaySpeeds};
pub use stats::{AggregateStats, PipelineSummary, WorkerStats};
pub use way::{EdgeRecord, WayNodeList};
