//! Append-only vector log with an embedded HNSW accelerator.
//!
//! This is the engine's durable core (§4.4): every mutation appends to the
//! log first, then updates the in-memory key index, then updates HNSW. A
//! failed HNSW mutation never rolls back the log write (§7
//! warn-and-continue) — the log remains authoritative and a reopen rebuilds
//! HNSW from scratch.

use super::format::{self, FileHeader, RecordHeader, FILE_HEADER_LEN, RECORD_HEADER_LEN};
use super::key_index::{KeyEntry, KeyIndex};
use crate::distance::Metric;
use crate::error::{Error, Result};
use crate::index::hnsw::{CountersSnapshot, HnswIndex, HnswParams};
use crate::record::{SearchHit, VectorRecord};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Durable log plus its two in-memory accelerators (key index, HNSW).
///
/// The file handle is behind its own mutex so reads (`get`, the
/// brute-force fallback in `search`) only need shared access to the rest
/// of the struct — this is what lets `Engine` serve concurrent searches
/// under a single `RwLock` read guard while a writer holds it exclusively.
#[derive(Debug)]
pub struct VectorLog {
    file: Mutex<File>,
    path: PathBuf,
    dimension: usize,
    metric: Metric,
    key_index: KeyIndex,
    hnsw: HnswIndex,
    next_id: u64,
    live_count: u64,
    created_at: u64,
    closed: bool,
}

impl VectorLog {
    /// Creates a new log file. Refuses if the target already exists.
    pub fn create(path: impl AsRef<Path>, dimension: usize, metric: Metric) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(Error::InvalidArgs(format!(
                "store already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        let now = now_unix();
        let header = FileHeader {
            dimension: dimension as u32,
            metric,
            live_count: 0,
            next_id: 1,
            created_at: now,
            modified_at: now,
        };
        header.write_to(&mut file)?;
        file.sync_all()?;

        Ok(Self {
            file: Mutex::new(file),
            path,
            dimension,
            metric,
            key_index: KeyIndex::new(),
            hnsw: HnswIndex::new(dimension, metric, HnswParams::default()),
            next_id: 1,
            live_count: 0,
            created_at: now,
            closed: false,
        })
    }

    /// Opens an existing log, replaying every record to rebuild the key
    /// index and a fresh HNSW index.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::DbNotFound(path.display().to_string()));
        }

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let header = FileHeader::read_from(&mut file)?;

        let dimension = header.dimension as usize;
        let metric = header.metric;
        let mut key_index = KeyIndex::new();
        let mut hnsw = HnswIndex::new(dimension, metric, HnswParams::default());
        let mut live_count = 0u64;

        let mut offset = FILE_HEADER_LEN;
        loop {
            file.seek(SeekFrom::Start(offset))?;
            let record_header = match RecordHeader::read_from(&mut file) {
                Ok(h) => h,
                Err(_) => break, // short/trailing partial record: tolerated, stop.
            };

            if record_header.tombstone {
                file.seek(SeekFrom::Current(i64::from(record_header.dimension) * 4))?;
            } else {
                match format::read_vector(&mut file, record_header.dimension as usize) {
                    Ok(vector) => {
                        key_index.insert(KeyEntry {
                            id: record_header.id,
                            file_offset: offset,
                            dimension: record_header.dimension,
                            timestamp: record_header.timestamp,
                            tombstoned: false,
                        });
                        if hnsw.insert(record_header.id, vector).is_err() {
                            tracing::warn!(
                                id = record_header.id,
                                "failed to re-insert vector into HNSW during open"
                            );
                        }
                        live_count += 1;
                    }
                    Err(_) => break, // short read inside the record body: tolerated, stop.
                }
            }

            offset += RECORD_HEADER_LEN + u64::from(record_header.dimension) * 4;
        }

        tracing::info!(path = %path.display(), live_count, "opened store");

        Ok(Self {
            file: Mutex::new(file),
            path,
            dimension,
            metric,
            key_index,
            hnsw,
            next_id: header.next_id,
            live_count,
            created_at: header.created_at,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidArgs("store is closed".into()));
        }
        Ok(())
    }

    /// Inserts `vector` under `id`. Rejects a duplicate live id or a
    /// dimension mismatch; never rejects on an HNSW failure (warn and
    /// continue).
    pub fn insert(&mut self, id: u64, vector: Vec<f32>) -> Result<()> {
        self.ensure_open()?;
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.key_index.contains_live(id) {
            return Err(Error::InvalidArgs(format!("id {id} already exists")));
        }

        let timestamp = now_unix();
        let record_header = RecordHeader {
            id,
            dimension: self.dimension as u32,
            timestamp,
            tombstone: false,
        };
        let offset = {
            let mut f = self.file.lock();
            let offset = f.seek(SeekFrom::End(0))?;
            record_header.write_to(&mut *f)?;
            format::write_vector(&mut *f, &vector)?;
            f.flush()?;
            f.sync_all()?;
            offset
        };

        self.key_index.insert(KeyEntry {
            id,
            file_offset: offset,
            dimension: self.dimension as u32,
            timestamp,
            tombstoned: false,
        });

        if self.hnsw.insert(id, vector).is_err() {
            tracing::warn!(id, "HNSW insert failed; log write stands, index is now stale");
        }

        if id >= self.next_id {
            self.next_id = id + 1;
        }
        self.live_count += 1;
        Ok(())
    }

    /// Reads back the vector stored under `id`.
    pub fn get(&self, id: u64) -> Result<VectorRecord> {
        self.ensure_open()?;
        let entry = self
            .key_index
            .get(id)
            .copied()
            .filter(|e| !e.tombstoned)
            .ok_or(Error::VectorNotFound(id))?;

        let mut f = self.file.lock();
        f.seek(SeekFrom::Start(entry.file_offset))?;
        let record_header = RecordHeader::read_from(&mut *f)?;
        if record_header.tombstone {
            return Err(Error::VectorNotFound(id));
        }
        let vector = format::read_vector(&mut *f, record_header.dimension as usize)?;
        Ok(VectorRecord::new(id, vector, record_header.timestamp))
    }

    /// Tombstones `id` in both the file and the key index, and removes it
    /// from HNSW (warn-and-continue on HNSW failure).
    pub fn delete(&mut self, id: u64) -> Result<()> {
        self.ensure_open()?;
        let entry = self
            .key_index
            .get(id)
            .copied()
            .ok_or(Error::VectorNotFound(id))?;
        if entry.tombstoned {
            return Err(Error::VectorNotFound(id));
        }

        self.key_index.tombstone(id);

        const TOMBSTONE_BYTE_OFFSET: u64 = 20;
        {
            let mut f = self.file.lock();
            f.seek(SeekFrom::Start(entry.file_offset + TOMBSTONE_BYTE_OFFSET))?;
            f.write_all(&[1u8])?;
            f.flush()?;
            f.sync_all()?;
        }

        if self.hnsw.remove(id).is_err() {
            tracing::warn!(id, "HNSW remove failed; index is now stale");
        }
        self.live_count = self.live_count.saturating_sub(1);
        Ok(())
    }

    /// Top-k search, trying HNSW first and falling back to a full scan if
    /// HNSW errors or returns nothing on a non-empty store.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchHit>> {
        self.ensure_open()?;
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Err(Error::InvalidArgs("k must be greater than 0".into()));
        }
        if !(-1.0..=1.0).contains(&min_similarity) {
            return Err(Error::InvalidArgs(
                "min_similarity must be within [-1, 1]".into(),
            ));
        }
        if self.live_count == 0 {
            return Ok(Vec::new());
        }

        let ef = 2 * k;
        let hits = match self.hnsw.search(query, k, ef) {
            Ok(hits) if !hits.is_empty() => hits
                .into_iter()
                .map(|h| SearchHit::new(h.id, h.score))
                .collect(),
            _ => {
                tracing::warn!("HNSW search returned nothing usable; falling back to full scan");
                self.brute_force_search(query, k)?
            }
        };

        Ok(Self::apply_min_similarity(hits, min_similarity))
    }

    fn apply_min_similarity(hits: Vec<SearchHit>, min_similarity: f32) -> Vec<SearchHit> {
        if min_similarity == 0.0 {
            return hits;
        }
        hits.into_iter()
            .filter(|h| h.score >= min_similarity)
            .collect()
    }

    fn brute_force_search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let entries: Vec<KeyEntry> = self.key_index.iter_live().copied().collect();
        let mut scored = Vec::with_capacity(entries.len());
        let mut f = self.file.lock();
        for entry in entries {
            f.seek(SeekFrom::Start(entry.file_offset))?;
            let record_header = RecordHeader::read_from(&mut *f)?;
            if record_header.tombstone {
                continue;
            }
            let vector = format::read_vector(&mut *f, record_header.dimension as usize)?;
            let score = self.metric.score(query, &vector);
            scored.push(SearchHit::new(entry.id, score));
        }
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        scored.truncate(k);
        Ok(scored)
    }

    /// Rewrites the header with final counters and marks the log closed.
    /// A second call is a no-op error (`invalid-args`).
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        let header = FileHeader {
            dimension: self.dimension as u32,
            metric: self.metric,
            live_count: self.live_count,
            next_id: self.next_id,
            created_at: self.created_at,
            modified_at: now_unix(),
        };
        let mut f = self.file.lock();
        f.seek(SeekFrom::Start(0))?;
        header.write_to(&mut *f)?;
        f.sync_all()?;
        drop(f);
        self.closed = true;
        tracing::info!(path = %self.path.display(), "closed store");
        Ok(())
    }

    /// Unlinks the log file at `path`. Requires the log to have been
    /// closed by the caller first.
    pub fn drop_path(path: impl AsRef<Path>) -> Result<()> {
        std::fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// Current live vector count.
    #[must_use]
    pub fn live_count(&self) -> u64 {
        self.live_count
    }

    /// Configured dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Configured metric.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// On-disk size in bytes.
    pub fn size_on_disk(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    /// Path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if a prior HNSW routine flagged an invariant violation.
    #[must_use]
    pub fn hnsw_integrity_violated(&self) -> bool {
        self.hnsw.integrity_violated()
    }

    /// Runs the HNSW repair pass, clearing the integrity flag.
    pub fn repair_hnsw(&mut self) {
        self.hnsw.repair();
    }

    /// Operational counters tracked by the in-memory HNSW index, readable
    /// without taking the log's own lock beyond this call.
    #[must_use]
    pub fn counters(&self) -> CountersSnapshot {
        self.hnsw.counters()
    }
}
