//! Worker thread for parallel processing
//!
//! Each worker drains one lane, matches ways against the speed table and
//! expands matched ways into directed edge records for the writer.

use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

use crate::parsers::WayNodesParser;
use crate::speed_table::{SpeedTable, WaySpeeds};
use crate::stats::WorkerStats;
use crate::way::{EdgeRecord, WayNodeList};

use super::types::RecordBatch;

/// Expand a way into one record per segment per matched direction
///
/// Forward records follow the stored node order; backward records reverse
/// each segment. Speeds are written as magnitudes.
pub fn expand_way(way: &WayNodeList, speeds: &WaySpeeds) -> Vec<EdgeRecord> {
    let directions = speeds.forward.is_some() as usize + speeds.backward.is_some() as usize;
    let mut records = Vec::with_capacity(way.edge_count() * directions);

    if let Some(speed) = speeds.forward {
        records.extend(
            way.segments()
                .map(|(from, to)| EdgeRecord::new(from, to, speed.abs())),
        );
    }
    if let Some(speed) = speeds.backward {
        records.extend(
            way.segments()
                .map(|(from, to)| EdgeRecord::new(to, from, speed.abs())),
        );
    }

    records
}

/// Per-lane matching state
pub struct WayMatcher {
    worker_id: usize,
    parser: WayNodesParser,
    speeds: Arc<SpeedTable>,
    stats: WorkerStats,
}

impl WayMatcher {
    pub fn new(worker_id: usize, speeds: Arc<SpeedTable>) -> Self {
        Self {
            worker_id,
            parser: WayNodesParser::new(),
            speeds,
            stats: WorkerStats::new(),
        }
    }

    /// Handle one raw line, returning records when the way matched
    ///
    /// Malformed lines are logged and skipped; they never count as seen ways.
    pub fn process_line(&mut self, line: &str) -> Option<Vec<EdgeRecord>> {
        if line.trim().is_empty() {
            self.stats.record_blank();
            return None;
        }

        let way = match self.parser.parse(line) {
            Ok(way) => way,
            Err(e) => {
                log::warn!("worker {}: skipping line '{}': {}", self.worker_id, line, e);
                self.stats.record_malformed();
                return None;
            }
        };

        let speeds = self.speeds.lookup(way.way_id);
        self.stats.record_way(&way, &speeds);
        if !speeds.is_matched() {
            return None;
        }

        Some(expand_way(&way, &speeds))
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    pub fn into_stats(self) -> WorkerStats {
        self.stats
    }
}

/// Worker thread: drains its lane until closed, then reports its stats
pub(crate) fn worker_thread(
    worker_id: usize,
    lane: Receiver<String>,
    speeds: Arc<SpeedTable>,
    record_sender: Sender<RecordBatch>,
    stats_sender: Sender<WorkerStats>,
) -> Result<()> {
    let mut matcher = WayMatcher::new(worker_id, speeds);

    for line in lane.iter() {
        let Some(records) = matcher.process_line(&line) else {
            continue;
        };
        if records.is_empty() {
            continue;
        }
        if record_sender
            .send(RecordBatch { worker_id, records })
            .is_err()
        {
            return Err(anyhow!(
                "Worker {}: writer stopped before the lane was drained",
                worker_id
            ));
        }
    }

    // Output lane is done for this worker before the stats handoff
    drop(record_sender);

    let stats = matcher.into_stats();
    log::debug!(
        "worker {} finished: {} ways, {} matched, {} records",
        worker_id,
        stats.ways,
        stats.ways_matched,
        stats.total_records()
    );
    stats_sender
        .send(stats)
        .map_err(|_| anyhow!("Worker {}: statistics collector closed", worker_id))
}
