//! Point-in-time store statistics.

use crate::distance::Metric;
use crate::index::hnsw::CountersSnapshot;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot returned by `Engine::stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Count of currently-live (non-tombstoned) vectors.
    pub live_count: u64,
    /// Size of the backing log file in bytes.
    pub on_disk_size: u64,
    /// Configured vector dimension.
    pub dimension: usize,
    /// Configured similarity metric.
    pub metric: Metric,
    /// Path to the backing log file.
    pub path: PathBuf,
    /// Operational counters tracked by the in-memory HNSW index.
    pub counters: CountersSnapshot,
}
