//! Runs one match-and-dump pass from a resolved configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

use crate::config::EdgeSpeedConfig;
use crate::decompression::open_mapping_file;
use crate::formatters::EdgeFormatter;
use crate::parallel::{EdgeWriter, ParallelProcessor};
use crate::platform::OutputFile;
use crate::speed_table::{CsvSpeedSource, SpeedLoad, SpeedSource};
use crate::stats::PipelineSummary;

/// Load speeds from the configured CSV file, then dump matched edges
pub fn run(config: &EdgeSpeedConfig) -> Result<PipelineSummary> {
    let source = CsvSpeedSource::new(&config.input.speeds);
    let load = source.load()?;
    run_dump(config, load)
}

/// Dump matched edges using an already loaded speed table
///
/// Both the mapping file and the output file are opened before any worker
/// starts, so an unreadable input or unwritable output fails the run without
/// creating partial output.
pub fn run_dump(config: &EdgeSpeedConfig, load: SpeedLoad) -> Result<PipelineSummary> {
    if load.duplicates > 0 {
        log::warn!(
            "{} speed entries were overridden by later rows",
            load.duplicates
        );
    }
    if load.table.is_empty() {
        log::warn!("speed table is empty; no records will be written");
    }

    let reader = open_mapping_file(&config.input.mapping)?;
    let output = OutputFile::create(&config.output.path)?;
    let writer = EdgeWriter::new(output, EdgeFormatter::new(config.output.precision));

    let speed_entries = load.table.len();
    let speeds = Arc::new(load.table);
    let processor = ParallelProcessor::new(config.parallel_config());

    let start = Instant::now();
    let outcome = processor
        .process(reader, speeds, writer)
        .with_context(|| {
            format!(
                "Failed to dump edges from '{}' to '{}'",
                config.input.mapping.display(),
                config.output.path.display()
            )
        })?;
    let elapsed = start.elapsed();

    log::info!(
        "wrote {} records to {}",
        outcome.records_written,
        outcome.output.path().display()
    );

    Ok(PipelineSummary {
        stats: outcome.stats,
        lines_read: outcome.source.lines_read,
        source_error: outcome.source.read_error,
        records_written: outcome.records_written,
        speed_entries,
        elapsed,
    })
}
