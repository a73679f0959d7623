//! Similarity kernel: pure distance/similarity functions over equal-length
//! float slices, plus the `Metric` enum selecting among them.
//!
//! Every function here assumes `a.len() == b.len()`; a mismatch is a
//! programmer error caught upstream (the engine validates dimension before
//! any of these run) rather than something these functions check.

use serde::{Deserialize, Serialize};

/// Similarity metric selectable per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// `⟨a,b⟩ / (‖a‖·‖b‖)`.
    Cosine,
    /// `⟨a,b⟩`.
    Dot,
    /// `sqrt(Σ(a-b)²)`, negated by `score` so higher is uniformly better.
    Euclidean,
}

impl Metric {
    /// Parses the on-disk metric tag used in the file header (§6).
    #[must_use]
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::Cosine),
            1 => Some(Self::Dot),
            2 => Some(Self::Euclidean),
            _ => None,
        }
    }

    /// On-disk metric tag used in the file header (§6).
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Cosine => 0,
            Self::Dot => 1,
            Self::Euclidean => 2,
        }
    }

    /// Raw metric value between `a` and `b` (a distance for Euclidean, a
    /// similarity for Cosine/Dot).
    #[must_use]
    pub fn raw(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine(a, b),
            Self::Dot => dot(a, b),
            Self::Euclidean => euclidean(a, b),
        }
    }

    /// Score for which larger is always better, as HNSW and the brute-force
    /// scan both require. Euclidean's raw distance is negated.
    #[must_use]
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine | Self::Dot => self.raw(a, b),
            Self::Euclidean => -euclidean(a, b),
        }
    }

    /// True for metrics whose raw value already has "larger is better"
    /// semantics (cosine, dot); false for euclidean, whose raw value is a
    /// distance and must be negated via `score`.
    #[must_use]
    pub const fn higher_is_better(self) -> bool {
        !matches!(self, Self::Euclidean)
    }
}

const NORM_EPSILON: f32 = 1e-12;

/// Cosine similarity. Returns 0.0 if either vector's norm is below a small
/// epsilon (degenerate zero vector), rather than dividing by zero.
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot_acc = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot_acc += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return 0.0;
    }
    dot_acc / (norm_a * norm_b)
}

/// Dot product.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean distance (not negated — callers wanting "higher is better"
/// semantics should use `Metric::score`).
#[must_use]
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
#[path = "distance_tests.rs"]
mod tests;
