//! Statistics aggregation for parallel processing
//!
//! Every worker sends exactly one `WorkerStats` when its lane closes. The
//! collection point is a channel sized to the worker count, so reporting
//! never blocks. Once the workers are joined the aggregator folds all
//! summaries in a single thread; nothing is shared mutably.

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::stats::{AggregateStats, WorkerStats};

pub struct StatsAggregator {
    expected: usize,
    sender: Sender<WorkerStats>,
    receiver: Receiver<WorkerStats>,
}

impl StatsAggregator {
    pub fn new(num_workers: usize) -> Self {
        let (sender, receiver) = bounded(num_workers.max(1));
        Self {
            expected: num_workers,
            sender,
            receiver,
        }
    }

    /// Handle given to one worker for its single report
    pub fn reporter(&self) -> Sender<WorkerStats> {
        self.sender.clone()
    }

    /// Close the collection point and fold every report
    ///
    /// Call only after all workers have been joined; a missing report means
    /// a worker ended without finishing its lane.
    pub fn finish(self) -> Result<AggregateStats> {
        let Self {
            expected,
            sender,
            receiver,
        } = self;
        drop(sender);

        let aggregate: AggregateStats = receiver.iter().collect();
        if aggregate.workers_reported != expected {
            return Err(anyhow!(
                "Expected statistics from {} workers, received {}",
                expected,
                aggregate.workers_reported
            ));
        }
        Ok(aggregate)
    }
}
