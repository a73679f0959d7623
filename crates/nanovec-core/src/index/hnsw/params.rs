//! HNSW construction/search parameters.

/// Tuning knobs for an `HnswIndex`. Defaults match §3's declared defaults.
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    /// Max out-degree at levels above 0. Level 0 caps at `2 * m`.
    pub m: usize,
    /// Beam width used while inserting.
    pub ef_construction: usize,
    /// Default beam width used while searching, when the caller does not
    /// request a wider one via `ef = max(ef_search, k)`.
    pub ef_search: usize,
    /// Multiplier applied to the exponential draw that picks a new node's
    /// level; defaults to `1 / ln(2)`.
    pub level_mult: f64,
    /// Hard cap on the level a node can be assigned, regardless of the
    /// random draw.
    pub max_level_cap: usize,
}

impl HnswParams {
    /// Max out-degree at level 0.
    #[must_use]
    pub const fn max_connections_0(&self) -> usize {
        self.m * 2
    }

    /// Max out-degree at levels above 0.
    #[must_use]
    pub const fn max_connections(&self, level: usize) -> usize {
        if level == 0 {
            self.max_connections_0()
        } else {
            self.m
        }
    }
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 50,
            level_mult: 1.0 / std::f64::consts::LN_2,
            max_level_cap: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let p = HnswParams::default();
        assert_eq!(p.m, 16);
        assert_eq!(p.ef_construction, 200);
        assert_eq!(p.ef_search, 50);
        assert_eq!(p.max_connections(0), 32);
        assert_eq!(p.max_connections(1), 16);
    }
}
