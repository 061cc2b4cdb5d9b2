use std::fmt::Write as _;

use crate::way::EdgeRecord;

/// How speeds are rendered in the output file
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeedPrecision {
    /// Whole numbers, truncated toward zero
    #[default]
    Integer,
    /// Six decimal places
    Decimal,
}

/// Formats edge records as `from,to,speed` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFormatter {
    precision: SpeedPrecision,
}

impl EdgeFormatter {
    pub fn new(precision: SpeedPrecision) -> Self {
        Self { precision }
    }

    /// Append one record, without the line terminator, to `buf`
    pub fn format_into(&self, record: &EdgeRecord, buf: &mut String) {
        let speed = record.speed;
        // Writing to a String cannot fail
        let _ = match self.precision {
            SpeedPrecision::Integer => {
                write!(buf, "{},{},{}", record.from, record.to, speed.trunc() as i64)
            }
            SpeedPrecision::Decimal => {
                write!(buf, "{},{},{:.6}", record.from, record.to, speed)
            }
        };
    }

    pub fn format(&self, record: &EdgeRecord) -> String {
        let mut buf = String::with_capacity(48);
        self.format_into(record, &mut buf);
        buf
    }
}
