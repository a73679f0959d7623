//! # nanovec-core
//!
//! Embeddable vector database engine: an append-only vector log backed by
//! a chained-hash key index and an in-memory HNSW approximate
//! nearest-neighbor index.
//!
//! `nanovec` is meant to be linked into a host process, not run as a
//! service: one [`Engine`] owns one store end to end (create, insert, get,
//! delete, search, close, drop) and every mutation is durable the moment
//! it returns.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use nanovec_core::{Engine, EngineConfig, Metric};
//!
//! # fn main() -> nanovec_core::Result<()> {
//! let config = EngineConfig::new("docs", "./docs.nvdb", 4, Metric::Cosine);
//! let engine = Engine::create(config)?;
//! engine.insert(1, vec![0.1, 0.2, 0.3, 0.4])?;
//! let hits = engine.search(&[0.1, 0.2, 0.3, 0.4], 5, 0.0)?;
//! engine.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod fileutil;
pub mod heap;
pub mod index;
pub mod record;
pub mod stats;
pub mod storage;

pub use config::EngineConfig;
pub use distance::Metric;
pub use engine::Engine;
pub use error::{Error, Result, CODE_SUCCESS};
pub use record::{SearchHit, VectorRecord};
pub use stats::Stats;
