//! Main parallel processor
//!
//! Wires the partitioner, the worker pool, the writer and the statistics
//! aggregator together and joins them in order.

use anyhow::{anyhow, Result};
use crossbeam_channel::bounded;
use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::speed_table::SpeedTable;
use crate::stats::AggregateStats;

use super::partition::{create_lanes, partitioner_thread, Partitioner};
use super::sink::{writer_thread, Destination, EdgeWriter};
use super::tracker::StatsAggregator;
use super::types::{ParallelConfig, SourceSummary};
use super::worker::worker_thread;

/// Everything a finished pipeline hands back
#[derive(Debug)]
pub struct PipelineOutcome<W> {
    pub output: W,
    pub stats: AggregateStats,
    pub source: SourceSummary,
    pub records_written: u64,
}

/// Main parallel processor
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Run the match-and-dump pipeline over `reader`
    ///
    /// The speed table must be complete before this is called; workers only
    /// read it.
    pub fn process<R, W>(
        &self,
        reader: R,
        speeds: Arc<SpeedTable>,
        writer: EdgeWriter<W>,
    ) -> Result<PipelineOutcome<W>>
    where
        R: BufRead + Send + 'static,
        W: Destination + Send + 'static,
    {
        let num_workers = self.config.num_workers.max(1);
        let (lane_senders, lane_receivers) = create_lanes(num_workers, self.config.lane_capacity);
        let (record_sender, record_receiver) = bounded(self.config.output_buffer.max(1));
        let aggregator = StatsAggregator::new(num_workers);

        log::info!(
            "starting pipeline: {} workers, lane capacity {}",
            num_workers,
            self.config.lane_capacity
        );

        let writer_handle = thread::spawn(move || writer_thread(record_receiver, writer));

        let mut worker_handles = Vec::with_capacity(num_workers);
        for (worker_id, lane) in lane_receivers.into_iter().enumerate() {
            let record_sender = record_sender.clone();
            let speeds = Arc::clone(&speeds);
            let reporter = aggregator.reporter();

            let handle = thread::spawn(move || {
                worker_thread(worker_id, lane, speeds, record_sender, reporter)
            });
            worker_handles.push(handle);
        }

        // Drop our sender so the writer sees the lane close after the last worker
        drop(record_sender);

        let partitioner = Partitioner::new(lane_senders)?;
        let partition_handle = thread::spawn(move || partitioner_thread(reader, partitioner));

        let source_result = join_thread(partition_handle, "Partitioner");
        let worker_results: Vec<Result<()>> = worker_handles
            .into_iter()
            .enumerate()
            .map(|(idx, handle)| join_thread(handle, &format!("Worker {}", idx)))
            .collect();
        let writer_result = join_thread(writer_handle, "Writer");

        // A writer failure makes the workers and partitioner fail too; report the root cause
        let (output, records_written) = writer_result?;
        for result in worker_results {
            result?;
        }
        let source = source_result?;
        let stats = aggregator.finish()?;

        Ok(PipelineOutcome {
            output,
            stats,
            source,
            records_written,
        })
    }
}

fn join_thread<T>(handle: JoinHandle<Result<T>>, name: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("{} thread panicked", name))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::EdgeFormatter;
    use std::collections::BTreeSet;
    use std::io::{Cursor, Read};

    fn run(input: &str, speeds: &[(i64, f64)], workers: usize) -> PipelineOutcome<Vec<u8>> {
        let config = ParallelConfig::default()
            .with_workers(workers)
            .with_lane_capacity(2)
            .with_output_buffer(1);
        let table: SpeedTable = speeds.iter().copied().collect();
        ParallelProcessor::new(config)
            .process(
                Cursor::new(input.to_string()),
                Arc::new(table),
                EdgeWriter::new(Vec::new(), EdgeFormatter::default()),
            )
            .unwrap()
    }

    fn lines(output: &[u8]) -> BTreeSet<String> {
        String::from_utf8_lossy(output)
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_single_forward_way() {
        let outcome = run("24418325,84760891102,19496208102\n", &[(24418325, 33.0)], 2);
        assert_eq!(
            String::from_utf8(outcome.output).unwrap(),
            "84760891102,19496208102,33\n"
        );
        assert_eq!(outcome.records_written, 1);
        assert_eq!(outcome.stats.workers_reported, 2);
    }

    #[test]
    fn test_bidirectional_way_any_order() {
        let outcome = run("100,1,2,3\n", &[(100, 10.0), (-100, 20.0)], 3);
        let expected: BTreeSet<String> = ["1,2,10", "2,3,10", "2,1,20", "3,2,20"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(lines(&outcome.output), expected);
        assert_eq!(outcome.records_written, 4);
    }

    #[test]
    fn test_many_ways_across_workers() {
        let input: String = (1..=200u64)
            .map(|w| format!("{},{},{},{}\n", w, w * 10, w * 10 + 1, w * 10 + 2))
            .collect();
        let speeds: Vec<(i64, f64)> = (1..=200i64)
            .filter(|w| w % 2 == 0)
            .map(|w| (w, w as f64))
            .collect();

        let outcome = run(&input, &speeds, 4);
        assert_eq!(outcome.source.lines_read, 200);
        assert_eq!(outcome.stats.totals.ways, 200);
        assert_eq!(outcome.stats.totals.nodes, 600);
        assert_eq!(outcome.stats.totals.ways_matched, 100);
        assert_eq!(outcome.stats.totals.fwd_records, 200);
        assert_eq!(outcome.records_written, 200);
        assert_eq!(lines(&outcome.output).len(), 200);
    }

    #[test]
    fn test_malformed_and_unmatched_lines() {
        let outcome = run("500,1\nabc,1,2\n7,1,2\n\n", &[(500, 1.0)], 2);
        assert!(outcome.output.is_empty());
        let totals = outcome.stats.totals;
        assert_eq!(totals.ways, 1);
        assert_eq!(totals.ways_matched, 0);
        assert_eq!(totals.malformed_lines, 2);
        assert_eq!(totals.blank_lines, 1);
    }

    #[test]
    fn test_empty_input() {
        let outcome = run("", &[(1, 1.0)], 3);
        assert!(outcome.output.is_empty());
        assert_eq!(outcome.stats.workers_reported, 3);
        assert_eq!(outcome.source.lines_read, 0);
    }

    #[test]
    fn test_same_multiset_across_runs() {
        let input: String = (1..=50u64)
            .map(|w| format!("{},{},{},{}\n", w, w, w + 1000, w + 2000))
            .collect();
        let speeds: Vec<(i64, f64)> = (1..=50i64).flat_map(|w| [(w, 5.0), (-w, 6.0)]).collect();

        let first = run(&input, &speeds, 4);
        let second = run(&input, &speeds, 4);
        let mut a: Vec<String> = String::from_utf8(first.output).unwrap().lines().map(str::to_string).collect();
        let mut b: Vec<String> = String::from_utf8(second.output).unwrap().lines().map(str::to_string).collect();
        a.sort();
        b.sort();
        assert_eq!(a.len(), 200);
        assert_eq!(a, b);
    }

    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl std::io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "device lost"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_keeps_partial_output() {
        let reader = std::io::BufReader::new(FailingReader {
            data: Cursor::new(b"100,1,2\n200,3,4\n300,5".to_vec()),
        });
        let table: SpeedTable = vec![(100, 10.0), (200, 20.0), (300, 30.0)]
            .into_iter()
            .collect();
        let config = ParallelConfig::default().with_workers(2);

        let outcome = ParallelProcessor::new(config)
            .process(
                reader,
                Arc::new(table),
                EdgeWriter::new(Vec::new(), EdgeFormatter::default()),
            )
            .unwrap();

        assert_eq!(outcome.source.lines_read, 2);
        assert_eq!(outcome.source.read_error.as_deref(), Some("device lost"));
        assert_eq!(outcome.records_written, 2);
        assert_eq!(lines(&outcome.output), BTreeSet::from(["1,2,10".to_string(), "3,4,20".to_string()]));
        assert_eq!(outcome.stats.workers_reported, 2);
    }
}
