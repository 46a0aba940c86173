// Client-side cache slot for the project list and active pointer
use anyhow::{anyhow, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use netdraft_core::PersistedState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_NAMESPACE: &str = "network-designer-projects";

/// On-disk envelope: `{"state": {...}, "version": 0}`.
#[derive(Debug, Serialize)]
struct SlotRef<'a> {
    state: &'a PersistedState,
    version: u32,
}

#[derive(Debug, Deserialize)]
struct Slot {
    state: PersistedState,
}

/// One JSON file per namespace, replaced atomically on every save.
///
/// Only `projects` and `currentProjectId` are stored; the working copy and
/// undo history never touch disk.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new<P: AsRef<Path>>(dir: P, namespace: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{}.json", namespace)),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)?;
        let slot: Slot = serde_json::from_slice(&data)
            .map_err(|e| anyhow!("Corrupt cache slot {:?}: {}", self.path, e))?;
        Ok(Some(slot.state))
    }

    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let data = serde_json::to_vec(&SlotRef { state, version: 0 })?;
        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(&data))
            .map_err(|e| anyhow!("Failed to write cache slot {:?}: {}", self.path, e))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
