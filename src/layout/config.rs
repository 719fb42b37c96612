// src/layout/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};
use tracing::info;

use super::ColumnLayout;

/// Source and target layouts handed to the transforms.
///
/// Either key may be left out of the JSON file; it then falls back to the
/// built-in layout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    pub source: ColumnLayout,
    pub target: ColumnLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source: ColumnLayout::source(),
            target: ColumnLayout::target(),
        }
    }
}

impl LayoutConfig {
    /// Read `{"source": [..], "target": [..]}` from `path` and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("opening layout file {}", path.display()))?;
        let cfg: LayoutConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parsing layout file {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("invalid layout file {}", path.display()))?;
        info!(
            path = %path.display(),
            source = cfg.source.len(),
            target = cfg.target.len(),
            "loaded layout config"
        );
        Ok(cfg)
    }

    /// Use the file at `path` when given, the built-in layouts otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (label, layout) in [("source", &self.source), ("target", &self.target)] {
            if layout.is_empty() {
                bail!("{} layout is empty", label);
            }
            let dups = layout.duplicates();
            if !dups.is_empty() {
                bail!("{} layout repeats column(s) {:?}", label, dups);
            }
        }
        Ok(())
    }
}
