//! On-disk vector log and its in-memory key index.

pub mod format;
pub mod key_index;
pub mod log;

pub use key_index::KeyIndex;
pub use log::VectorLog;
