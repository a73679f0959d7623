//! Hierarchical Navigable Small-World index.

mod graph;
mod node;
mod ordered_float;
mod params;
pub mod persistence;

pub use graph::{CountersSnapshot, GraphHit, HnswIndex};
pub use node::HnswNode;
pub use params::HnswParams;
