//! Persisted identity -> coordinate memory (JSON)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("position store I/O: {0}")]
    Io(#[from] io::Error),
    #[error("position store is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Last-used `[x, y]` per identity. Entries are never evicted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionStore {
    positions: BTreeMap<String, [f64; 2]>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<(f64, f64)> {
        self.positions.get(identity).map(|&[x, y]| (x, y))
    }

    pub fn upsert(&mut self, identity: &str, x: f64, y: f64) {
        self.positions.insert(identity.to_string(), [x, y]);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let store: PositionStore = serde_json::from_str(&content)?;
        Ok(store)
    }

    /// Like `load`, but a missing or unreadable file is an empty store.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => {
                debug!("Loaded {} stored positions from {:?}", store.len(), path);
                store
            }
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No position store at {:?}, starting empty", path);
                Self::new()
            }
            Err(e) => {
                warn!("Ignoring position store {:?}: {}", path, e);
                Self::new()
            }
        }
    }

    /// Writes to a sibling temp file, then renames it over `path`.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(self)?;
        let tmp = temp_path(path);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// `positions.dat` -> `positions.dat.tmp`, whatever the extension.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl FromIterator<(String, (f64, f64))> for PositionStore {
    fn from_iter<I: IntoIterator<Item = (String, (f64, f64))>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().map(|(k, (x, y))| (k, [x, y])).collect(),
        }
    }
}
