use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sidecar file name, stored alongside the downloaded PDFs.
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub publish_date: String,
}

/// The metadata sidecar: bulletin file name → publish date.
///
/// Keys are bare file names so the collector and the extractor agree on the
/// join key no matter where the directory lives. Every insert rewrites the
/// sidecar, so a crash mid-run loses at most the entry being written.
pub struct MetaStore {
    path: PathBuf,
    entries: BTreeMap<String, MetaEntry>,
}

impl MetaStore {
    /// Load the sidecar at `path`, or start empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, file_name: &str) -> Option<&MetaEntry> {
        self.entries.get(file_name)
    }

    /// Insert an entry and rewrite the sidecar.
    pub fn record(&mut self, file_name: &str, publish_date: &str) -> Result<()> {
        self.entries.insert(
            file_name.to_string(),
            MetaEntry {
                publish_date: publish_date.to_string(),
            },
        );
        self.flush()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))
    }
}
