pub mod way_nodes;

pub use way_nodes::{ParseError, WayNodesParser};
