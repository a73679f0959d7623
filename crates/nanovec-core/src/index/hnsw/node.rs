//! HNSW node storage.
//!
//! Each node owns its vector data and one neighbor list per level it
//! participates in, indexed `0..=level`. Neighbor entries are indices into
//! the index's node array, not vector ids.

/// A single node in the graph.
#[derive(Debug, Clone)]
pub struct HnswNode {
    /// Vector id this node represents.
    pub id: u64,
    /// Vector data, length equal to the index's dimension.
    pub vector: Vec<f32>,
    /// Neighbor indices per level: `connections[l]` holds this node's
    /// out-edges at level `l`.
    pub connections: Vec<Vec<usize>>,
}

impl HnswNode {
    /// Creates a node at the given level with empty neighbor lists.
    #[must_use]
    pub fn new(id: u64, vector: Vec<f32>, level: usize) -> Self {
        Self {
            id,
            vector,
            connections: vec![Vec::new(); level + 1],
        }
    }

    /// Highest level this node participates in.
    #[must_use]
    pub fn level(&self) -> usize {
        self.connections.len() - 1
    }

    /// Neighbors of this node at `level`, or an empty slice if the node
    /// does not reach that level.
    #[must_use]
    pub fn neighbors(&self, level: usize) -> &[usize] {
        self.connections.get(level).map_or(&[], Vec::as_slice)
    }

    /// Mutable neighbor list at `level`, if the node reaches it.
    pub fn neighbors_mut(&mut self, level: usize) -> Option<&mut Vec<usize>> {
        self.connections.get_mut(level)
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
