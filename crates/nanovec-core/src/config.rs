//! Engine configuration.
//!
//! The engine consumes a validated configuration record; it does not load
//! files or environment variables itself (that is a host concern — see the
//! CLI's own config loader for the layered `figment` setup).

use crate::distance::Metric;
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Largest dimension the engine will accept.
pub const MAX_DIMENSION: usize = 4096;

/// Validated parameters for creating or opening a store.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Human-readable name, used only for logging and `stats`.
    pub name: String,
    /// Path to the log file backing this store.
    pub path: PathBuf,
    /// Vector dimension, in `[1, 4096]`.
    pub dimension: usize,
    /// Similarity metric.
    pub metric: Metric,
    /// Optional cap on live vector count; `None` means unbounded.
    pub max_vectors: Option<u64>,
}

impl EngineConfig {
    /// Builds a config without validating it. Use `validate_for_create` or
    /// `validate_for_open` before handing it to `Engine`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        dimension: usize,
        metric: Metric,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            dimension,
            metric,
            max_vectors: None,
        }
    }

    /// Sets the optional max-vector bound (builder style).
    #[must_use]
    pub fn with_max_vectors(mut self, max_vectors: u64) -> Self {
        self.max_vectors = Some(max_vectors);
        self
    }

    fn validate_common(&self) -> Result<()> {
        if self.dimension == 0 || self.dimension > MAX_DIMENSION {
            return Err(Error::InvalidArgs(format!(
                "dimension must be in [1, {MAX_DIMENSION}], got {}",
                self.dimension
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::InvalidArgs("path must not be empty".into()));
        }
        Ok(())
    }

    /// Validates a configuration intended for `Engine::create`: in addition
    /// to the common checks, the target path must not already exist.
    pub fn validate_for_create(&self) -> Result<()> {
        self.validate_common()?;
        if self.path.exists() {
            return Err(Error::InvalidArgs(format!(
                "store already exists at {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Validates a configuration intended for `Engine::open`.
    pub fn validate_for_open(&self) -> Result<()> {
        self.validate_common()?;
        if !self.path.exists() {
            return Err(Error::DbNotFound(self.path.display().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
