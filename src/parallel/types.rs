//! Type definitions for parallel processing
//!
//! Contains the pipeline configuration and the messages exchanged between
//! the partitioner, workers and writer.

use crate::way::EdgeRecord;

/// Default number of lines a lane buffers before the partitioner blocks
pub const DEFAULT_LANE_CAPACITY: usize = 10_000;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of lanes, one worker per lane
    pub num_workers: usize,
    /// Lines buffered per lane
    pub lane_capacity: usize,
    /// Record batches buffered between workers and the writer
    pub output_buffer: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let num_workers = num_cpus::get();
        Self {
            num_workers,
            lane_capacity: DEFAULT_LANE_CAPACITY,
            output_buffer: num_workers * 4,
        }
    }
}

impl ParallelConfig {
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn with_lane_capacity(mut self, lane_capacity: usize) -> Self {
        self.lane_capacity = lane_capacity.max(1);
        self
    }

    pub fn with_output_buffer(mut self, output_buffer: usize) -> Self {
        self.output_buffer = output_buffer.max(1);
        self
    }
}

/// Records produced for one matched way, sent to the writer as a unit
#[derive(Debug)]
pub struct RecordBatch {
    pub worker_id: usize,
    pub records: Vec<EdgeRecord>,
}

/// What the partitioner saw of the line source
#[derive(Debug, Default)]
pub struct SourceSummary {
    pub lines_read: u64,
    pub read_error: Option<String>,
}
