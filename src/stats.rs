use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::time::Duration;

use crate::speed_table::WaySpeeds;
use crate::way::WayNodeList;

/// Counters kept by one worker for its lane
///
/// Owned by the worker until its lane closes, then handed to the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub ways: u64,
    pub nodes: u64,
    pub fwd_records: u64,
    pub bwd_records: u64,
    pub ways_matched: u64,
    pub nodes_matched: u64,
    pub fwd_traffic_matched: u64,
    pub bwd_traffic_matched: u64,
    pub malformed_lines: u64,
    pub blank_lines: u64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a parsed way and, when matched, the records it expands into
    pub fn record_way(&mut self, way: &WayNodeList, speeds: &WaySpeeds) {
        let nodes = way.nodes.len() as u64;
        self.ways += 1;
        self.nodes += nodes;

        if !speeds.is_matched() {
            return;
        }

        let edges = way.edge_count() as u64;
        self.ways_matched += 1;
        self.nodes_matched += nodes;
        if speeds.forward.is_some() {
            self.fwd_traffic_matched += 1;
            self.fwd_records += edges;
        }
        if speeds.backward.is_some() {
            self.bwd_traffic_matched += 1;
            self.bwd_records += edges;
        }
    }

    pub fn record_malformed(&mut self) {
        self.malformed_lines += 1;
    }

    pub fn record_blank(&mut self) {
        self.blank_lines += 1;
    }

    pub fn total_records(&self) -> u64 {
        self.fwd_records + self.bwd_records
    }
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.ways += other.ways;
        self.nodes += other.nodes;
        self.fwd_records += other.fwd_records;
        self.bwd_records += other.bwd_records;
        self.ways_matched += other.ways_matched;
        self.nodes_matched += other.nodes_matched;
        self.fwd_traffic_matched += other.fwd_traffic_matched;
        self.bwd_traffic_matched += other.bwd_traffic_matched;
        self.malformed_lines += other.malformed_lines;
        self.blank_lines += other.blank_lines;
    }
}

impl Add for WorkerStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for WorkerStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Element-wise sum of every worker's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    #[serde(flatten)]
    pub totals: WorkerStats,
    pub workers_reported: usize,
}

impl FromIterator<WorkerStats> for AggregateStats {
    fn from_iter<I: IntoIterator<Item = WorkerStats>>(iter: I) -> Self {
        let mut aggregate = Self::default();
        for stats in iter {
            aggregate.totals += stats;
            aggregate.workers_reported += 1;
        }
        aggregate
    }
}

/// Everything reported once a run completes
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub stats: AggregateStats,
    pub lines_read: u64,
    pub source_error: Option<String>,
    pub records_written: u64,
    pub speed_entries: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl PipelineSummary {
    pub fn format_stats(&self) -> String {
        let t = &self.stats.totals;
        let mut output = String::new();

        output.push_str(&format!(
            "Ways loaded: {} ({} nodes) from {} lines",
            t.ways, t.nodes, self.lines_read
        ));
        if t.malformed_lines > 0 {
            output.push_str(&format!(", {} malformed lines skipped", t.malformed_lines));
        }
        output.push('\n');

        output.push_str(&format!(
            "Ways matched: {} ({} nodes); {} forward, {} backward",
            t.ways_matched, t.nodes_matched, t.fwd_traffic_matched, t.bwd_traffic_matched
        ));
        if self.speed_entries > 0 {
            output.push_str(&format!(" against {} speed entries", self.speed_entries));
        }
        output.push('\n');

        output.push_str(&format!(
            "Records generated: {} forward, {} backward; {} written",
            t.fwd_records, t.bwd_records, self.records_written
        ));

        let elapsed_ms = self.elapsed.as_millis();
        output.push_str(&format!(" in {}ms", elapsed_ms));
        if elapsed_ms > 0 && t.ways > 0 {
            let ways_per_sec = (t.ways as f64 * 1000.0) / elapsed_ms as f64;
            output.push_str(&format!(" ({:.0} ways/s)", ways_per_sec));
        }

        if let Some(error) = &self.source_error {
            output.push_str(&format!("\nInput ended early: {}", error));
        }

        output
    }

    pub fn format_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize stats: {}\"}}", e))
    }
}
