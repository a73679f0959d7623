//! In-memory key -> file-offset index.
//!
//! A fixed-size bucket array sized to a prime, chained by separate
//! chaining, hashed by `id mod table_size` — deliberately not
//! `std::collections::HashMap`, per the data model in §3. A dynamic resize
//! is a valid extension (§9) but is not implemented here: past the
//! documented capacity, chain lengths grow and lookups degrade to linear
//! per bucket, which is an accepted tradeoff for an embedded engine with a
//! bounded vector count.

/// Default bucket count: the smallest prime at or above 10^4.
pub const DEFAULT_TABLE_SIZE: usize = 10_007;

/// One entry in the key index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEntry {
    /// Vector id.
    pub id: u64,
    /// Byte offset of the record's header within the log file.
    pub file_offset: u64,
    /// Vector dimension recorded at insert time.
    pub dimension: u32,
    /// Unix-seconds insert timestamp.
    pub timestamp: u64,
    /// Whether this entry has been tombstoned.
    pub tombstoned: bool,
}

/// Chained-hash map from vector id to `KeyEntry`.
#[derive(Debug)]
pub struct KeyIndex {
    table_size: usize,
    buckets: Vec<Vec<KeyEntry>>,
}

impl KeyIndex {
    /// Creates an empty index with the default bucket count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table_size(DEFAULT_TABLE_SIZE)
    }

    /// Creates an empty index with an explicit bucket count (tests use a
    /// small one to exercise collisions cheaply).
    #[must_use]
    pub fn with_table_size(table_size: usize) -> Self {
        Self {
            table_size,
            buckets: vec![Vec::new(); table_size],
        }
    }

    fn bucket_of(&self, id: u64) -> usize {
        (id % self.table_size as u64) as usize
    }

    /// Inserts or overwrites the entry for `id`.
    pub fn insert(&mut self, entry: KeyEntry) {
        let idx = self.bucket_of(entry.id);
        let bucket = &mut self.buckets[idx];
        if let Some(existing) = bucket.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            bucket.push(entry);
        }
    }

    /// Looks up an entry by id, regardless of tombstone state.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&KeyEntry> {
        self.buckets[self.bucket_of(id)]
            .iter()
            .find(|e| e.id == id)
    }

    /// Marks the entry for `id` tombstoned in place. Returns `false` if
    /// the id is absent.
    pub fn tombstone(&mut self, id: u64) -> bool {
        let bucket = self.bucket_of(id);
        if let Some(entry) = self.buckets[bucket].iter_mut().find(|e| e.id == id) {
            entry.tombstoned = true;
            true
        } else {
            false
        }
    }

    /// True if `id` has a live (non-tombstoned) entry.
    #[must_use]
    pub fn contains_live(&self, id: u64) -> bool {
        self.get(id).is_some_and(|e| !e.tombstoned)
    }

    /// Iterates every live entry.
    pub fn iter_live(&self) -> impl Iterator<Item = &KeyEntry> {
        self.buckets
            .iter()
            .flat_map(|b| b.iter())
            .filter(|e| !e.tombstoned)
    }

    /// Count of live entries (O(n); callers needing this on every mutation
    /// should track a separate counter instead).
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.iter_live().count()
    }
}

impl Default for KeyIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, offset: u64) -> KeyEntry {
        KeyEntry {
            id,
            file_offset: offset,
            dimension: 4,
            timestamp: 0,
            tombstoned: false,
        }
    }

    #[test]
    fn insert_and_get() {
        let mut idx = KeyIndex::with_table_size(7);
        idx.insert(entry(1, 80));
        assert_eq!(idx.get(1).unwrap().file_offset, 80);
        assert!(idx.get(2).is_none());
    }

    #[test]
    fn handles_bucket_collisions() {
        let mut idx = KeyIndex::with_table_size(4);
        idx.insert(entry(1, 10));
        idx.insert(entry(5, 20)); // 1 % 4 == 5 % 4 == 1, forces a chain
        assert_eq!(idx.get(1).unwrap().file_offset, 10);
        assert_eq!(idx.get(5).unwrap().file_offset, 20);
    }

    #[test]
    fn tombstone_marks_without_removing() {
        let mut idx = KeyIndex::with_table_size(7);
        idx.insert(entry(1, 10));
        assert!(idx.tombstone(1));
        assert!(idx.get(1).is_some());
        assert!(!idx.contains_live(1));
        assert!(!idx.tombstone(99));
    }

    #[test]
    fn iter_live_skips_tombstoned() {
        let mut idx = KeyIndex::with_table_size(7);
        idx.insert(entry(1, 10));
        idx.insert(entry(2, 20));
        idx.tombstone(1);
        let live: Vec<u64> = idx.iter_live().map(|e| e.id).collect();
        assert_eq!(live, vec![2]);
        assert_eq!(idx.live_count(), 1);
    }
}
