/// A way's geometry as read from one mapping line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WayNodeList {
    pub way_id: u64,
    pub nodes: Vec<u64>,
}

impl WayNodeList {
    pub fn new(way_id: u64, nodes: Vec<u64>) -> Self {
        Self { way_id, nodes }
    }

    /// Number of directed edges one matched direction expands into
    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Consecutive node pairs in stored orientation
    pub fn segments(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.nodes.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// One directed node-to-node speed observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from: u64,
    pub to: u64,
    pub speed: f64,
}

impl EdgeRecord {
    pub fn new(from: u64, to: u64, speed: f64) -> Self {
        Self { from, to, speed }
    }
}
