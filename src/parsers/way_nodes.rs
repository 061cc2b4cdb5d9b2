use thiserror::Error;

use crate::way::WayNodeList;

/// Minimum number of fields on a usable mapping line: way id plus two nodes
pub const MIN_FIELDS: usize = 3;

const DELIMITER: char = ',';

/// Why a mapping line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected at least 3 fields, found {found}")]
    TooFewFields { found: usize },
    #[error("invalid way id '{value}'")]
    InvalidWayId { value: String },
    #[error("invalid node id '{value}' at position {position}")]
    InvalidNodeId { value: String, position: usize },
}

/// Parser for `wayId,node1,node2,...,nodeN` mapping lines
#[derive(Debug, Clone, Copy, Default)]
pub struct WayNodesParser;

impl WayNodesParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, line: &str) -> Result<WayNodeList, ParseError> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let found = line.split(DELIMITER).count();
        if found < MIN_FIELDS {
            return Err(ParseError::TooFewFields { found });
        }

        let mut fields = line.split(DELIMITER).map(str::trim);

        // split always yields at least one item
        let raw_way_id = fields.next().unwrap_or_default();
        let way_id = raw_way_id
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidWayId {
                value: raw_way_id.to_string(),
            })?;

        let mut nodes = Vec::with_capacity(found - 1);
        for (position, raw) in fields.enumerate() {
            let node = raw.parse::<u64>().map_err(|_| ParseError::InvalidNodeId {
                value: raw.to_string(),
                position: position + 1,
            })?;
            nodes.push(node);
        }

        Ok(WayNodeList::new(way_id, nodes))
    }
}
