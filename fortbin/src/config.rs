//! Configuration file loading
//!
//! ```toml
//! log_level = "debug"
//!
//! [format]
//! marker_width = 4
//! byte_order = "little"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use fortbin_engine::FormatConfig;

/// Contents of a fortbin configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Log level used when `--log-level` is not given
    pub log_level: Option<String>,
    /// Record format
    pub format: FormatConfig,
}

impl FileConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
