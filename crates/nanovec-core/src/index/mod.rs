//! Index implementations. Currently just HNSW; the brute-force fallback
//! lives in `storage::log` since it operates directly on the log's
//! key index rather than on graph state.

pub mod hnsw;
