//! Layered CLI configuration: defaults, then `nanovec.toml` in the current
//! directory, then `NANOVEC_*` environment variables. This is a host-only
//! concern — `nanovec_core::Engine` never reads files or the environment
//! itself.

use anyhow::Context;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Default output format for commands that print a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// One field per line, human-readable.
    Plain,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

/// Settings loaded independently of any single subcommand's flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    /// Default output format when a command's `--format` flag is absent.
    pub format: OutputFormat,
    /// Default `ef_search`-style result count used by `search` when `--k`
    /// is omitted.
    pub default_k: usize,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            default_k: 10,
        }
    }
}

impl CliSettings {
    /// Loads defaults, overlaid by `./nanovec.toml` if present, overlaid by
    /// `NANOVEC_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("nanovec.toml"))
            .merge(Env::prefixed("NANOVEC_"))
            .extract()
            .context("failed to load CLI configuration")
    }
}
