//! Speed-by-way lookup table and the sources that build it
//!
//! Keys are signed way ids: a positive key is the forward observation for a
//! way, `-wayId` is the backward observation. The table is built once before
//! the pipeline starts and is only read afterwards, so workers share it
//! through an `Arc` without locking.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Direction of travel relative to a way's stored node order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Both,
}

impl FromStr for Direction {
    type Err = SpeedRowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "f" => Ok(Direction::Forward),
            "backward" | "b" => Ok(Direction::Backward),
            "both" => Ok(Direction::Both),
            _ => Err(SpeedRowError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// Forward and backward speeds found for one unsigned way id
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaySpeeds {
    pub forward: Option<f64>,
    pub backward: Option<f64>,
}

impl WaySpeeds {
    pub fn is_matched(&self) -> bool {
        self.forward.is_some() || self.backward.is_some()
    }
}

/// Mapping from signed way id to observed speed
#[derive(Debug, Clone, Default)]
pub struct SpeedTable {
    speeds: HashMap<i64, f64>,
}

impl SpeedTable {
    /// Insert under a signed key, returning the replaced speed if any
    pub fn insert(&mut self, signed_way_id: i64, speed: f64) -> Option<f64> {
        self.speeds.insert(signed_way_id, speed)
    }

    pub fn get(&self, signed_way_id: i64) -> Option<f64> {
        self.speeds.get(&signed_way_id).copied()
    }

    pub fn lookup(&self, way_id: u64) -> WaySpeeds {
        // ids beyond i64::MAX cannot be keyed in a signed table
        let Ok(key) = i64::try_from(way_id) else {
            return WaySpeeds::default();
        };
        WaySpeeds {
            forward: self.get(key),
            backward: if key == 0 { None } else { self.get(-key) },
        }
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}

impl FromIterator<(i64, f64)> for SpeedTable {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Self {
            speeds: iter.into_iter().collect(),
        }
    }
}

/// Why a speed-table row was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeedRowError {
    #[error("expected at least 2 fields, found {found}")]
    TooFewFields { found: usize },
    #[error("invalid way id '{value}'")]
    InvalidWayId { value: String },
    #[error("invalid speed '{value}'")]
    InvalidSpeed { value: String },
    #[error("invalid direction '{value}' (expected forward, backward or both)")]
    InvalidDirection { value: String },
    #[error("way id {way_id} must be unsigned when a direction is given")]
    NegativeWayWithDirection { way_id: i64 },
}

/// Convert one row into the signed entries it contributes
pub fn parse_speed_row(record: &StringRecord) -> Result<Vec<(i64, f64)>, SpeedRowError> {
    if record.len() < 2 {
        return Err(SpeedRowError::TooFewFields {
            found: record.len(),
        });
    }

    let raw_way_id = &record[0];
    let way_id = raw_way_id
        .parse::<i64>()
        .map_err(|_| SpeedRowError::InvalidWayId {
            value: raw_way_id.to_string(),
        })?;

    let raw_speed = &record[1];
    let speed = raw_speed
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
        .ok_or_else(|| SpeedRowError::InvalidSpeed {
            value: raw_speed.to_string(),
        })?;

    let direction = match record.get(2).filter(|d| !d.is_empty()) {
        Some(raw) => raw.parse::<Direction>()?,
        None => return Ok(vec![(way_id, speed)]),
    };

    if way_id < 0 {
        return Err(SpeedRowError::NegativeWayWithDirection { way_id });
    }

    Ok(match direction {
        Direction::Forward => vec![(way_id, speed)],
        Direction::Backward => vec![(-way_id, speed)],
        Direction::Both => vec![(way_id, speed), (-way_id, speed)],
    })
}

/// Result of loading a speed table, with bookkeeping for the report
#[derive(Debug, Default)]
pub struct SpeedLoad {
    pub table: SpeedTable,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicates: usize,
}

/// Anything able to produce the speed table for a run
pub trait SpeedSource {
    fn load(&self) -> Result<SpeedLoad>;
}

/// Speed table read from a local CSV file
///
/// Rows are `wayId,speed` with a signed way id, or `wayId,speed,direction`
/// with an unsigned id and a `forward|backward|both` flag. Lines starting with
/// `#` are comments.
#[derive(Debug, Clone)]
pub struct CsvSpeedSource {
    path: PathBuf,
}

impl CsvSpeedSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_from_reader<R: std::io::Read>(&self, reader: R) -> Result<SpeedLoad> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .from_reader(reader);

        let mut load = SpeedLoad::default();
        for (index, result) in csv_reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| {
                        format!("Failed to read speed file '{}'", self.path.display())
                    });
                }
                Err(e) => {
                    log::warn!("speed file row {}: {}", index + 1, e);
                    load.rows_skipped += 1;
                    continue;
                }
            };
            load.rows_read += 1;

            match parse_speed_row(&record) {
                Ok(entries) => {
                    for (key, speed) in entries {
                        if load.table.insert(key, speed).is_some() {
                            load.duplicates += 1;
                        }
                    }
                }
                Err(e) => {
                    log::warn!("speed file row {}: {}", index + 1, e);
                    load.rows_skipped += 1;
                }
            }
        }

        Ok(load)
    }
}

impl SpeedSource for CsvSpeedSource {
    fn load(&self) -> Result<SpeedLoad> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open speed file '{}'", self.path.display()))?;
        let load = self.load_from_reader(std::io::BufReader::new(file))?;
        log::info!(
            "loaded {} speed entries from {} rows ({} skipped)",
            load.table.len(),
            load.rows_read,
            load.rows_skipped
        );
        Ok(load)
    }
}
