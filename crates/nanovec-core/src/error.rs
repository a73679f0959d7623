//! Error types surfaced by the engine.
//!
//! Every public entry point returns one of the eight stable error codes
//! below. Codes are integers so a host binding can map them without string
//! matching; each also carries a human-readable message via `thiserror`.

use thiserror::Error;

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected input: bad arguments, duplicate id, malformed configuration.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// Allocation failed while constructing a node or growing a buffer.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Underlying file I/O failed.
    #[error("file I/O error: {0}")]
    FileIo(#[from] std::io::Error),

    /// The store does not exist where expected (open/drop of a missing file).
    #[error("store not found: {0}")]
    DbNotFound(String),

    /// The requested vector id is absent or tombstoned.
    #[error("vector not found: {0}")]
    VectorNotFound(u64),

    /// Vector dimension did not match the store's configured dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension declared by the store.
        expected: usize,
        /// Dimension of the rejected vector.
        actual: usize,
    },

    /// The log file failed magic/version validation, or a structural
    /// invariant was violated beyond what a repair pass can fix inline.
    #[error("store corrupt: {0}")]
    DbCorrupt(String),
}

impl Error {
    /// Stable integer code surfaced to callers, per the error taxonomy:
    /// success=0, invalid-args=-1, out-of-memory=-2, file-io=-3,
    /// db-not-found=-4, vector-not-found=-5, dimension-mismatch=-6,
    /// db-corrupt=-7.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::InvalidArgs(_) => -1,
            Self::OutOfMemory(_) => -2,
            Self::FileIo(_) => -3,
            Self::DbNotFound(_) => -4,
            Self::VectorNotFound(_) => -5,
            Self::DimensionMismatch { .. } => -6,
            Self::DbCorrupt(_) => -7,
        }
    }

    /// Stable human-readable name for the error class (independent of the
    /// formatted message, which may carry per-call detail).
    #[must_use]
    pub const fn code_name(&self) -> &'static str {
        match self {
            Self::InvalidArgs(_) => "invalid-args",
            Self::OutOfMemory(_) => "out-of-memory",
            Self::FileIo(_) => "file-io",
            Self::DbNotFound(_) => "db-not-found",
            Self::VectorNotFound(_) => "vector-not-found",
            Self::DimensionMismatch { .. } => "dimension-mismatch",
            Self::DbCorrupt(_) => "db-corrupt",
        }
    }
}

/// Success code for the integer taxonomy (§6). There is no `Error` variant
/// for success; callers map `Ok(_)` to this constant when surfacing codes
/// across a host boundary (e.g. the CLI's process exit status).
pub const CODE_SUCCESS: i32 = 0;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
