//! Writer thread for parallel processing
//!
//! The only consumer of the shared output lane. Records are appended in the
//! order batches arrive; the destination is finalized once the lane closes.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use std::io::{self, Write};

use crate::formatters::EdgeFormatter;
use crate::platform::OutputFile;

use super::types::RecordBatch;

/// A place records can be written to and finalized exactly once
pub trait Destination: Write {
    fn finalize(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Destination for OutputFile {
    fn finalize(&mut self) -> io::Result<()> {
        self.flush_and_sync()
    }
}

impl Destination for Vec<u8> {}

/// Formats records and appends them line by line
pub struct EdgeWriter<W: Destination> {
    output: W,
    formatter: EdgeFormatter,
    line: String,
    records_written: u64,
}

impl<W: Destination> EdgeWriter<W> {
    pub fn new(output: W, formatter: EdgeFormatter) -> Self {
        Self {
            output,
            formatter,
            line: String::with_capacity(64),
            records_written: 0,
        }
    }

    pub fn write_batch(&mut self, batch: &RecordBatch) -> io::Result<()> {
        for record in &batch.records {
            self.line.clear();
            self.formatter.format_into(record, &mut self.line);
            self.line.push('\n');
            self.output.write_all(self.line.as_bytes())?;
            self.records_written += 1;
        }
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and finalize the destination, returning it with the record count
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        self.output.finalize()?;
        Ok((self.output, self.records_written))
    }
}

/// Writer thread: drains the output lane until every worker has dropped its sender
pub(crate) fn writer_thread<W: Destination>(
    receiver: Receiver<RecordBatch>,
    writer: EdgeWriter<W>,
) -> Result<(W, u64)> {
    let mut writer = writer;
    for batch in receiver.iter() {
        writer
            .write_batch(&batch)
            .with_context(|| format!("Failed writing records from worker {}", batch.worker_id))?;
    }

    let (output, written) = writer.finish().context("Failed to finalize output")?;
    log::debug!("writer finished: {} records", written);
    Ok((output, written))
}
