//! The embeddable façade: `Engine` owns one store end to end (§5).
//!
//! Concurrency model: a single `parking_lot::RwLock<VectorLog>` wraps the
//! log, key index, and HNSW graph together. Readers (`get`, `search`) take
//! a shared read guard — `VectorLog`'s own file access is behind its own
//! internal mutex, so many searches proceed in parallel whenever HNSW
//! alone can answer them. Writers (`insert`, `delete`, `close`) take the
//! exclusive write guard, which is what serializes the
//! log-then-key-index-then-HNSW write ordering the format requires; a
//! second `Mutex<()>` guarding just that ordering would be redundant since
//! `VectorLog` already bundles exactly those three things atomically.

use crate::config::EngineConfig;
use crate::distance::Metric;
use crate::error::{Error, Result};
use crate::record::{SearchHit, VectorRecord};
use crate::stats::Stats;
use crate::storage::VectorLog;
use parking_lot::RwLock;

/// An open vector store.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    inner: RwLock<VectorLog>,
}

impl Engine {
    /// Creates a new store per `config`, which must pass
    /// `validate_for_create`.
    pub fn create(config: EngineConfig) -> Result<Self> {
        config.validate_for_create()?;
        let log = VectorLog::create(&config.path, config.dimension, config.metric)?;
        tracing::info!(name = %config.name, path = %config.path.display(), "created store");
        Ok(Self {
            config,
            inner: RwLock::new(log),
        })
    }

    /// Opens an existing store per `config`, which must pass
    /// `validate_for_open`.
    pub fn open(config: EngineConfig) -> Result<Self> {
        config.validate_for_open()?;
        let log = VectorLog::open(&config.path)?;
        if log.dimension() != config.dimension {
            return Err(Error::DimensionMismatch {
                expected: config.dimension,
                actual: log.dimension(),
            });
        }
        Ok(Self {
            config,
            inner: RwLock::new(log),
        })
    }

    /// Opens an existing store at `path`, adopting the dimension and
    /// metric recorded in its own file header rather than requiring the
    /// caller to already know them. Convenient for hosts (e.g. the CLI)
    /// that only ever see a bare path.
    pub fn open_path(name: impl Into<String>, path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::DbNotFound(path.display().to_string()));
        }
        let log = VectorLog::open(&path)?;
        let config = EngineConfig::new(name, path, log.dimension(), log.metric());
        Ok(Self {
            config,
            inner: RwLock::new(log),
        })
    }

    /// Inserts `vector` under `id`.
    ///
    /// # Errors
    ///
    /// `invalid-args` on a duplicate live id, `dimension-mismatch` if
    /// `vector.len()` does not match the store's configured dimension.
    pub fn insert(&self, id: u64, vector: Vec<f32>) -> Result<()> {
        if let Some(max) = self.config.max_vectors {
            let mut guard = self.inner.write();
            if guard.live_count() >= max {
                return Err(Error::InvalidArgs(format!(
                    "store is at its configured capacity of {max} vectors"
                )));
            }
            return guard.insert(id, vector);
        }
        self.inner.write().insert(id, vector)
    }

    /// Reads back the vector stored under `id`.
    ///
    /// # Errors
    ///
    /// `vector-not-found` if `id` is absent or has been deleted.
    pub fn get(&self, id: u64) -> Result<VectorRecord> {
        self.inner.read().get(id)
    }

    /// Deletes the vector stored under `id`.
    ///
    /// # Errors
    ///
    /// `vector-not-found` if `id` is absent or already deleted.
    pub fn delete(&self, id: u64) -> Result<()> {
        self.inner.write().delete(id)
    }

    /// Finds the `k` nearest vectors to `query` under the store's metric.
    /// `min_similarity` of `0.0` disables score filtering.
    ///
    /// # Errors
    ///
    /// `invalid-args` if `k == 0` or `min_similarity` is outside `[-1, 1]`;
    /// `dimension-mismatch` if `query.len()` does not match.
    pub fn search(&self, query: &[f32], k: usize, min_similarity: f32) -> Result<Vec<SearchHit>> {
        self.inner.read().search(query, k, min_similarity)
    }

    /// Flushes final counters to the header and marks the store closed.
    /// Subsequent operations other than `drop` return `invalid-args`.
    pub fn close(&self) -> Result<()> {
        self.inner.write().close()
    }

    /// Removes the store's backing file. The caller is responsible for
    /// calling `close` first if the engine is still open. Fails if the
    /// file is already gone.
    pub fn drop_store(config: &EngineConfig) -> Result<()> {
        VectorLog::drop_path(&config.path)
    }

    /// Removes the store's backing file at `path` directly, for hosts that
    /// only have a bare path and never opened the store.
    pub fn drop_path(path: impl AsRef<std::path::Path>) -> Result<()> {
        VectorLog::drop_path(path)
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> Result<Stats> {
        let guard = self.inner.read();
        Ok(Stats {
            live_count: guard.live_count(),
            on_disk_size: guard.size_on_disk()?,
            dimension: guard.dimension(),
            metric: guard.metric(),
            path: guard.path().to_path_buf(),
            counters: guard.counters(),
        })
    }

    /// Configured similarity metric.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    /// Configured vector dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// True if a prior HNSW routine flagged an invariant violation; callers
    /// may choose to run `repair` before further mutation.
    pub fn hnsw_needs_repair(&self) -> bool {
        self.inner.read().hnsw_integrity_violated()
    }

    /// Strips dangling HNSW edges and re-elects the entry point.
    pub fn repair_hnsw(&self) {
        self.inner.write().repair_hnsw();
    }
}
