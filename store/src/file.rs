//! File-backed state store.
//!
//! The state is written as a versioned bincode snapshot. Commits write a
//! sibling temp file and rename it over the target, so a crash mid-commit
//! leaves the previous snapshot intact.

use crate::{BridgeState, StateStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current on-disk snapshot format.
pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    state: BridgeState,
}

/// Stores the bridge state in a single snapshot file.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<BridgeState>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = bincode::deserialize(&bytes)
            .map_err(|e| StoreError::Corruption(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Corruption(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        tracing::debug!(path = %self.path.display(), "loaded bridge state snapshot");
        Ok(Some(snapshot.state))
    }

    fn commit(&self, state: &BridgeState) -> Result<(), StoreError> {
        let bytes = bincode::serialize(&Snapshot {
            version: SNAPSHOT_VERSION,
            state: state.clone(),
        })?;
        let temp = self.temp_path();
        fs::write(&temp, &bytes)?;
        fs::rename(&temp, &self.path)?;
        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "committed bridge state");
        Ok(())
    }
}
