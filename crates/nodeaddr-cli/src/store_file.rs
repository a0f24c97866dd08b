//! Store files: `{ "<job id>": { "<ltree path>": <content> } }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nodeaddr_io::memory::JobNodes;
use nodeaddr_io::prelude::MemoryStore;

/// Load a store file. A missing file is an empty store.
pub fn load(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let jobs: BTreeMap<String, JobNodes> = serde_json::from_str(&text)
        .with_context(|| format!("parse store {}", path.display()))?;
    Ok(MemoryStore::from_jobs(jobs))
}

pub fn save(path: &Path, store: &MemoryStore) -> Result<()> {
    let jobs = store.snapshot()?;
    let text = serde_json::to_string_pretty(&jobs)?;
    fs::write(path, text + "\n")
        .with_context(|| format!("write {}", path.display()))
}
