//! In-memory value types for a stored vector and a search hit.

use serde::{Deserialize, Serialize};

/// A vector as handed back to the caller: an id, its data, and the unix
/// timestamp of the record that produced it. The caller owns this value;
/// dropping it releases the copy read out of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// 64-bit key.
    pub id: u64,
    /// Vector data, length equal to the store's configured dimension.
    pub vector: Vec<f32>,
    /// Unix-seconds timestamp recorded at insert time.
    pub timestamp: u64,
}

impl VectorRecord {
    /// Creates a new record.
    #[must_use]
    pub const fn new(id: u64, vector: Vec<f32>, timestamp: u64) -> Self {
        Self {
            id,
            vector,
            timestamp,
        }
    }

    /// Dimension of the stored vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// One hit from a `search` call: the matching id and its metric-adjusted
/// score (higher is always better, per `Metric::score`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Id of the matching vector.
    pub id: u64,
    /// Score under the requested metric; larger is better.
    pub score: f32,
}

impl SearchHit {
    /// Creates a new search hit.
    #[must_use]
    pub const fn new(id: u64, score: f32) -> Self {
        Self { id, score }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
