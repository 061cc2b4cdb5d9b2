//! Round-robin partitioner
//!
//! Routes the k-th input line to lane `k mod N`. Each lane is a bounded
//! channel read by exactly one worker, so lines sharing a lane keep their
//! relative order. A full lane blocks routing until its worker catches up.

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;

use super::source::LineSource;
use super::types::SourceSummary;

/// Lane receiving the line at `index` (0-based) among `num_lanes` lanes
pub fn lane_for(index: u64, num_lanes: usize) -> usize {
    (index % num_lanes as u64) as usize
}

/// Create `num_lanes` bounded lanes, returning write and read ends by index
pub fn create_lanes(num_lanes: usize, capacity: usize) -> (Vec<Sender<String>>, Vec<Receiver<String>>) {
    (0..num_lanes).map(|_| bounded(capacity)).unzip()
}

/// Owns the write end of every lane
pub struct Partitioner {
    lanes: Vec<Sender<String>>,
}

impl Partitioner {
    pub fn new(lanes: Vec<Sender<String>>) -> Result<Self> {
        if lanes.is_empty() {
            return Err(anyhow!("Partitioner needs at least one lane"));
        }
        Ok(Self { lanes })
    }

    /// Route every line, then close all lanes by dropping their senders
    pub fn run<I: Iterator<Item = String>>(self, lines: I) -> Result<u64> {
        let num_lanes = self.lanes.len();
        let mut routed = 0u64;

        for line in lines {
            let lane = lane_for(routed, num_lanes);
            if self.lanes[lane].send(line).is_err() {
                return Err(anyhow!(
                    "Lane {} closed before input was exhausted",
                    lane
                ));
            }
            routed += 1;
        }

        log::debug!("partitioner routed {} lines over {} lanes", routed, num_lanes);
        Ok(routed)
    }
}

/// Partitioner thread: drains the line source into the lanes
pub(crate) fn partitioner_thread<R: BufRead>(
    reader: R,
    partitioner: Partitioner,
) -> Result<SourceSummary> {
    let mut source = LineSource::new(reader);
    partitioner.run(source.by_ref())?;

    Ok(SourceSummary {
        lines_read: source.lines_read(),
        read_error: source.error().map(|e| e.to_string()),
    })
}
