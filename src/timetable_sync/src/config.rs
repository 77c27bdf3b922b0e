//! Import configuration: parsing, normalization, and loading.
//!
//! A small TOML file tunes the parts of an import that the export itself does
//! not describe:
//! - how many lessons go into one INSERT statement,
//! - the building every imported classroom is anchored to,
//! - the week definition every imported lesson points at.
//!
//! Every field has a default, so an empty file (or no file at all) is valid.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// Default number of lessons inserted per statement.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Tunables for one import run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ImportConfig {
    /// Lessons per INSERT; also caps reference-class inserts.
    pub batch_size: usize,
    /// Building that anchors every classroom.
    pub building: NamedCfg,
    /// Week definition used as every lesson's week reference.
    pub week: NamedCfg,
}

/// A display name plus short code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NamedCfg {
    /// Display name, also the natural key the row is matched by.
    pub name: String,
    /// Short code.
    pub short: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            building: NamedCfg {
                name: "Main Building".into(),
                short: "MAIN".into(),
            },
            week: NamedCfg {
                name: "All weeks".into(),
                short: "ALL".into(),
            },
        }
    }
}

impl ImportConfig {
    /// Same defaults with a different batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Normalize a config in place.
///
/// - Trims names and short codes
/// - Rejects a zero batch size and names that are empty after trimming
pub fn normalize_config(cfg: &mut ImportConfig) -> anyhow::Result<()> {
    if cfg.batch_size == 0 {
        bail!("batch_size must be at least 1");
    }
    for (what, named) in [("building", &mut cfg.building), ("week", &mut cfg.week)] {
        named.name = named.name.trim().to_string();
        named.short = named.short.trim().to_string();
        if named.name.is_empty() {
            bail!("{what}.name cannot be empty after trimming");
        }
        if named.short.is_empty() {
            bail!("{what}.short cannot be empty after trimming");
        }
    }
    Ok(())
}

/// Parse and normalize a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<ImportConfig> {
    let mut cfg: ImportConfig =
        toml::from_str(toml_str).context("failed to parse import config TOML")?;
    normalize_config(&mut cfg).context("invalid import config")?;
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and normalize it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<ImportConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read import config {}", path.as_ref().display()))?;
    load_config_str(&text)
}
