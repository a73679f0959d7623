//! Total-ordering wrapper for `f32` scores used in heap comparisons.
//!
//! Uses `f32::total_cmp`, which defines a full order over every bit pattern
//! including NaN. The similarity kernel never produces NaN from finite
//! inputs, but a corrupt record tolerated by the log's short-read handling
//! could in principle surface one; this keeps such a value from corrupting
//! heap invariants instead of panicking or silently misordering results.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderedFloat(pub f32);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
#[path = "ordered_float_tests.rs"]
mod tests;
