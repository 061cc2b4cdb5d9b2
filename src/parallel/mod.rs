//! Parallel match-and-dump pipeline
//!
//! # Module Structure
//!
//! - `types`: Pipeline configuration and messages
//! - `source`: Line source over the mapping file
//! - `partition`: Round-robin partitioner and lanes
//! - `worker`: Worker threads matching ways against the speed table
//! - `sink`: Writer thread draining the shared output lane
//! - `tracker`: Statistics aggregator
//! - `processor`: Main ParallelProcessor orchestration

mod partition;
mod processor;
mod sink;
mod source;
mod tracker;
mod types;
mod worker;

pub use partition::{create_lanes, lane_for, Partitioner};
pub use processor::{ParallelProcessor, PipelineOutcome};
pub use sink::{Destination, EdgeWriter};
pub use source::LineSource;
pub use tracker::StatsAggregator;
pub use types::{ParallelConfig, RecordBatch, SourceSummary, DEFAULT_LANE_CAPACITY};
pub use worker::{expand_way, WayMatcher};
