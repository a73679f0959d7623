//! In-memory HNSW graph: add, remove with edge repair, and k-NN search.
//!
//! Nodes live in a dense arena (`Vec<Option<HnswNode>>`) addressed by
//! index, not vector id; a deleted node's slot becomes `None` and is never
//! reused (see DESIGN.md for why this was chosen over compaction). An
//! `id -> index` map gives O(1) lookup for delete, which the spec allows
//! but does not require.

use super::node::HnswNode;
use super::ordered_float::OrderedFloat;
use super::params::HnswParams;
use crate::distance::Metric;
use crate::error::{Error, Result};
use crate::heap::{BoundedHeap, Entry as HeapEntry, Orientation};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One hit from `HnswIndex::search`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphHit {
    /// Vector id.
    pub id: u64,
    /// Metric-adjusted score; larger is better.
    pub score: f32,
}

/// Operational counters, safe to read without any external lock.
#[derive(Debug, Default)]
pub struct GraphCounters {
    /// Total entries successfully inserted.
    pub inserts: AtomicU64,
    /// Total search calls.
    pub searches: AtomicU64,
    /// Total entries successfully removed.
    pub deletes: AtomicU64,
    /// Total pairwise distance evaluations across all operations.
    pub distance_computations: AtomicU64,
}

impl GraphCounters {
    fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            distance_computations: self.distance_computations.load(Ordering::Relaxed),
            memory_used_bytes: 0,
        }
    }
}

/// Point-in-time copy of `GraphCounters`, plus the in-memory footprint
/// estimate — the two host-facing counters a caller can read without a
/// lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersSnapshot {
    /// Total entries successfully inserted.
    pub inserts: u64,
    /// Total search calls.
    pub searches: u64,
    /// Total entries successfully removed.
    pub deletes: u64,
    /// Total pairwise distance evaluations across all operations.
    pub distance_computations: u64,
    /// Estimated heap footprint of node vectors and neighbor lists, in
    /// bytes. Not exact allocator accounting — just vector and
    /// connection-list payload sizes.
    pub memory_used_bytes: u64,
}

/// In-memory HNSW index.
#[derive(Debug)]
pub struct HnswIndex {
    dimension: usize,
    metric: Metric,
    params: HnswParams,
    nodes: Vec<Option<HnswNode>>,
    id_to_index: FxHashMap<u64, usize>,
    entry_point: Option<usize>,
    max_level: usize,
    live_count: usize,
    rng_state: u64,
    /// Set when a routine observes an out-of-range index or an impossible
    /// level. While set, `insert`/`remove` refuse to proceed.
    integrity_violated: AtomicBool,
    counters: GraphCounters,
}

impl HnswIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(dimension: usize, metric: Metric, params: HnswParams) -> Self {
        Self {
            dimension,
            metric,
            params,
            nodes: Vec::new(),
            id_to_index: FxHashMap::default(),
            entry_point: None,
            max_level: 0,
            live_count: 0,
            rng_state: 0x5DEE_CE66_D1A4_B5B5,
            integrity_violated: AtomicBool::new(false),
            counters: GraphCounters::default(),
        }
    }

    /// Number of live vectors in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// True if the index holds no live vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// True if a prior routine flagged an invariant violation.
    #[must_use]
    pub fn integrity_violated(&self) -> bool {
        self.integrity_violated.load(Ordering::Acquire)
    }

    /// Point-in-time snapshot of the operational counters, including an
    /// estimate of this index's in-memory footprint.
    #[must_use]
    pub fn counters(&self) -> CountersSnapshot {
        CountersSnapshot {
            memory_used_bytes: self.memory_used_bytes(),
            ..self.counters.snapshot()
        }
    }

    /// Estimated heap footprint of node vectors and neighbor-list storage,
    /// in bytes. Vacant slots contribute nothing.
    fn memory_used_bytes(&self) -> u64 {
        let mut total = 0u64;
        for slot in &self.nodes {
            let Some(node) = slot else { continue };
            total += (node.vector.len() * std::mem::size_of::<f32>()) as u64;
            for level_neighbors in &node.connections {
                total += (level_neighbors.len() * std::mem::size_of::<usize>()) as u64;
            }
        }
        total
    }

    fn mark_violated(&self) {
        self.integrity_violated.store(true, Ordering::Release);
    }

    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        self.counters
            .distance_computations
            .fetch_add(1, Ordering::Relaxed);
        self.metric.score(a, b)
    }

    fn vector_of(&self, index: usize) -> &[f32] {
        self.nodes[index]
            .as_ref()
            .map_or(&[], |n| n.vector.as_slice())
    }

    /// Draws a level via xorshift64 + exponential transform, capped at
    /// `params.max_level_cap`. Not reproducible across processes; the spec
    /// does not require determinism here.
    fn random_layer(&mut self) -> usize {
        let mut state = self.rng_state;
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        self.rng_state = state;

        let uniform = (state as f64) / (u64::MAX as f64);
        let uniform = uniform.max(f64::MIN_POSITIVE);
        let level = (-uniform.ln() * self.params.level_mult).floor() as usize;
        level.min(self.params.max_level_cap)
    }

    /// Greedy 1-nearest walk at a single level: repeatedly move to the best
    /// unvisited neighbor until none improves.
    fn greedy_descend(&self, query: &[f32], entry: usize, level: usize) -> usize {
        let mut best = entry;
        let mut best_score = self.score(query, self.vector_of(best));
        loop {
            let neighbors = self.nodes[best]
                .as_ref()
                .map(|n| n.neighbors(level).to_vec())
                .unwrap_or_default();
            let mut improved = false;
            for neighbor in neighbors {
                if self.nodes[neighbor].is_none() {
                    continue;
                }
                let s = self.score(query, self.vector_of(neighbor));
                if s > best_score {
                    best = neighbor;
                    best_score = s;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        best
    }

    /// Beam search at `level` from `entry_points`, returning up to `ef`
    /// candidates sorted descending by score.
    fn beam_search(
        &self,
        query: &[f32],
        entry_points: &[usize],
        ef: usize,
        level: usize,
    ) -> Vec<(usize, f32)> {
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut frontier: BinaryHeap<(OrderedFloat, usize)> = BinaryHeap::new();
        let mut results = BoundedHeap::new(Orientation::Min, ef.max(1));

        for &ep in entry_points {
            if self.nodes[ep].is_none() || !visited.insert(ep) {
                continue;
            }
            let s = self.score(query, self.vector_of(ep));
            frontier.push((OrderedFloat(s), ep));
            results.offer(HeapEntry { node: ep, score: s });
        }

        while let Some((OrderedFloat(c_score), c_node)) = frontier.pop() {
            if let Some(worst) = results.peek() {
                if results.len() >= ef && c_score < worst.score {
                    break;
                }
            }

            let neighbors = self.nodes[c_node]
                .as_ref()
                .map(|n| n.neighbors(level).to_vec())
                .unwrap_or_default();

            for neighbor in neighbors {
                if neighbor >= self.nodes.len() {
                    self.mark_violated();
                    continue;
                }
                if self.nodes[neighbor].is_none() || !visited.insert(neighbor) {
                    continue;
                }
                let s = self.score(query, self.vector_of(neighbor));
                if results.len() < ef || s > results.peek().map_or(f32::NEG_INFINITY, |e| e.score) {
                    frontier.push((OrderedFloat(s), neighbor));
                    results.offer(HeapEntry {
                        node: neighbor,
                        score: s,
                    });
                }
            }
        }

        let mut out: Vec<(usize, f32)> = Vec::with_capacity(results.len());
        while let Some(e) = results.pop() {
            out.push((e.node, e.score));
        }
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }

    /// Selects up to `max_neighbors` candidates by score (simple top-M, no
    /// diversification heuristic — §4.3 only requires correctness, not a
    /// particular pruning strategy).
    fn select_neighbors(&self, candidates: &[(usize, f32)], max_neighbors: usize) -> Vec<usize> {
        candidates
            .iter()
            .take(max_neighbors)
            .map(|(idx, _)| *idx)
            .collect()
    }

    /// Adds a bidirectional edge between `a` and `b` at `level`, then prunes
    /// each side down to `max_conn` independently. Pruning one side can
    /// evict a neighbor whose reciprocal back-edge still points at the
    /// pruned node — `sync_back_edges` removes those dangling back-edges
    /// so every surviving edge stays symmetric, per the bidirectionality
    /// invariant.
    fn connect(&mut self, a: usize, b: usize, level: usize, max_conn: usize) {
        if let Some(node) = self.nodes[a].as_mut().and_then(|n| n.neighbors_mut(level)) {
            if !node.contains(&b) {
                node.push(b);
            }
        }
        if let Some(node) = self.nodes[b].as_mut().and_then(|n| n.neighbors_mut(level)) {
            if !node.contains(&a) {
                node.push(a);
            }
        }

        let evicted_from_a = self.prune_if_needed(a, level, max_conn);
        let evicted_from_b = self.prune_if_needed(b, level, max_conn);
        self.sync_back_edges(&evicted_from_a, a, level);
        self.sync_back_edges(&evicted_from_b, b, level);
    }

    /// Removes `source` from the neighbor list of every node in `evicted`
    /// at `level`, undoing the back-edge half of an edge whose forward
    /// half was just pruned away.
    fn sync_back_edges(&mut self, evicted: &[usize], source: usize, level: usize) {
        for &n in evicted {
            if let Some(node) = self.nodes[n].as_mut().and_then(|n| n.neighbors_mut(level)) {
                node.retain(|&x| x != source);
            }
        }
    }

    /// Trims `node_idx`'s neighbor list at `level` down to `max_conn`,
    /// keeping the highest-scoring neighbors. Returns the neighbors that
    /// were evicted, so the caller can remove their reciprocal back-edges.
    fn prune_if_needed(&mut self, node_idx: usize, level: usize, max_conn: usize) -> Vec<usize> {
        let Some(node) = self.nodes[node_idx].as_ref() else {
            return Vec::new();
        };
        let neighbors = node.neighbors(level);
        if neighbors.len() <= max_conn {
            return Vec::new();
        }
        let vector = node.vector.clone();
        let mut with_score: Vec<(usize, f32)> = neighbors
            .iter()
            .filter(|&&n| self.nodes[n].is_some())
            .map(|&n| (n, self.score(&vector, self.vector_of(n))))
            .collect();
        with_score.sort_by(|a, b| b.1.total_cmp(&a.1));
        let evicted: Vec<usize> = with_score[max_conn.min(with_score.len())..]
            .iter()
            .map(|&(n, _)| n)
            .collect();
        with_score.truncate(max_conn);
        let kept: Vec<usize> = with_score.into_iter().map(|(n, _)| n).collect();
        if let Some(n) = self.nodes[node_idx].as_mut().and_then(|n| n.neighbors_mut(level)) {
            *n = kept;
        }
        evicted
    }

    /// Inserts `vector` under `id`, returning the node index it was
    /// assigned. Callers are responsible for keeping ids unique — this
    /// layer does not check (the engine's key index owns that rule).
    pub fn insert(&mut self, id: u64, vector: Vec<f32>) -> Result<usize> {
        if self.integrity_violated() {
            return Err(Error::DbCorrupt(
                "HNSW integrity flag set; run repair before further mutation".into(),
            ));
        }
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let level = self.random_layer();
        let node = HnswNode::new(id, vector, level);
        let index = self.nodes.len();
        self.nodes.push(Some(node));
        self.id_to_index.insert(id, index);

        let Some(entry_point) = self.entry_point else {
            self.entry_point = Some(index);
            self.max_level = level;
            self.live_count += 1;
            self.counters.inserts.fetch_add(1, Ordering::Relaxed);
            return Ok(index);
        };

        let query = self.nodes[index].as_ref().unwrap().vector.clone();
        let mut current_ep = entry_point;
        for l in (level + 1..=self.max_level).rev() {
            current_ep = self.greedy_descend(&query, current_ep, l);
        }

        for l in (0..=level.min(self.max_level)).rev() {
            let candidates = self.beam_search(&query, &[current_ep], self.params.ef_construction, l);
            let max_conn = self.params.max_connections(l);
            let selected = self.select_neighbors(&candidates, max_conn);
            for &neighbor in &selected {
                self.connect(index, neighbor, l, max_conn);
            }
            if let Some(&(best, _)) = candidates.first() {
                current_ep = best;
            }
        }

        if level > self.max_level {
            self.max_level = level;
            self.entry_point = Some(index);
        }

        self.live_count += 1;
        self.counters.inserts.fetch_add(1, Ordering::Relaxed);
        Ok(index)
    }

    /// Removes the node holding `id`, repairing back-edges on every
    /// remaining node. Recomputes `entry_point`/`max_level` if the removed
    /// node was the entry point.
    pub fn remove(&mut self, id: u64) -> Result<()> {
        if self.integrity_violated() {
            return Err(Error::DbCorrupt(
                "HNSW integrity flag set; run repair before further mutation".into(),
            ));
        }
        let Some(index) = self.id_to_index.remove(&id) else {
            return Err(Error::VectorNotFound(id));
        };

        self.nodes[index] = None;

        for node in self.nodes.iter_mut().flatten() {
            for level_neighbors in &mut node.connections {
                level_neighbors.retain(|&n| n != index);
            }
        }

        if self.entry_point == Some(index) {
            self.reelect_entry_point();
        }

        self.live_count = self.live_count.saturating_sub(1);
        self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn reelect_entry_point(&mut self) {
        let best = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (i, n.level())))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)));
        match best {
            Some((idx, level)) => {
                self.entry_point = Some(idx);
                self.max_level = level;
            }
            None => {
                self.entry_point = None;
                self.max_level = 0;
            }
        }
    }

    /// Top-k search with beam width `ef` (the caller, typically the vector
    /// log, is responsible for computing `ef = max(requested_ef, k)`).
    /// Returns results sorted strictly descending by score, ties broken by
    /// ascending id, truncated to `k`.
    pub fn search(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<GraphHit>> {
        if self.integrity_violated() {
            return Err(Error::DbCorrupt(
                "HNSW integrity flag set; caller should fall back to brute force".into(),
            ));
        }
        self.counters.searches.fetch_add(1, Ordering::Relaxed);

        let Some(entry_point) = self.entry_point else {
            return Ok(Vec::new());
        };
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut current_ep = entry_point;
        for l in (1..=self.max_level).rev() {
            current_ep = self.greedy_descend(query, current_ep, l);
        }

        let ef = ef.max(k).max(1);
        let mut candidates = self.beam_search(query, &[current_ep], ef, 0);
        candidates.sort_by(|a, b| {
            b.1.total_cmp(&a.1).then_with(|| {
                let id_a = self.nodes[a.0].as_ref().map_or(u64::MAX, |n| n.id);
                let id_b = self.nodes[b.0].as_ref().map_or(u64::MAX, |n| n.id);
                id_a.cmp(&id_b)
            })
        });

        let hits = candidates
            .into_iter()
            .take(k)
            .filter_map(|(idx, score)| self.nodes[idx].as_ref().map(|n| GraphHit { id: n.id, score }))
            .collect();
        Ok(hits)
    }

    /// Discards every edge whose target is out of range or vacant, then
    /// re-elects the entry point and clears the integrity flag.
    pub fn repair(&mut self) {
        let is_present: Vec<bool> = self.nodes.iter().map(Option::is_some).collect();
        for node in self.nodes.iter_mut().flatten() {
            for level_neighbors in &mut node.connections {
                level_neighbors.retain(|&n| is_present.get(n).copied().unwrap_or(false));
            }
        }
        self.reelect_entry_point();
        self.integrity_violated.store(false, Ordering::Release);
    }

    /// Dimension this index was constructed with.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Metric this index was constructed with.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Construction/search parameters, for the persistence writer.
    #[must_use]
    pub(crate) fn params_snapshot(&self) -> HnswParams {
        self.params
    }

    /// Node arena, for the persistence writer.
    #[must_use]
    pub(crate) fn nodes_snapshot(&self) -> &[Option<HnswNode>] {
        &self.nodes
    }

    /// Entry point, for the persistence writer.
    #[must_use]
    pub(crate) fn entry_point_snapshot(&self) -> Option<usize> {
        self.entry_point
    }

    /// Max level, for the persistence writer.
    #[must_use]
    pub(crate) fn max_level_snapshot(&self) -> usize {
        self.max_level
    }

    /// Rebuilds an index directly from parts read by the persistence
    /// reader. Recomputes `live_count` and `id_to_index` from the node
    /// arena rather than trusting them to be encoded redundantly.
    pub(crate) fn from_parts(
        dimension: usize,
        metric: Metric,
        params: HnswParams,
        nodes: Vec<Option<HnswNode>>,
        entry_point: Option<usize>,
        max_level: usize,
    ) -> Self {
        let mut id_to_index = FxHashMap::default();
        let mut live_count = 0;
        for (i, slot) in nodes.iter().enumerate() {
            if let Some(node) = slot {
                id_to_index.insert(node.id, i);
                live_count += 1;
            }
        }
        Self {
            dimension,
            metric,
            params,
            nodes,
            id_to_index,
            entry_point,
            max_level,
            live_count,
            rng_state: 0x5DEE_CE66_D1A4_B5B5,
            integrity_violated: AtomicBool::new(false),
            counters: GraphCounters::default(),
        }
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
