//! JSON persistence of the store head.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MemoryNodeStore, StoreConfig, errors::StoreError};
use crate::{Error, Result, tree::NodeState};

/// The current state file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(rename = "_v", default, skip_serializing_if = "is_v0")]
    version: u8,
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    root: NodeState,
}

/// Write the head snapshot and revision of `store` to `path` as JSON.
pub(crate) fn save_to_file<P: AsRef<Path>>(store: &MemoryNodeStore, path: P) -> Result<()> {
    let (root, revision) = store.head_with_revision();
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        revision,
        root,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { StoreError::SerializationFailed { source: e }.into() })?;
    std::fs::write(path, json).map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })
}

/// Load a store from a JSON state file.
///
/// If the file does not exist, a new, empty store is returned.
pub(crate) fn load_from_file<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<MemoryNodeStore> {
    let json = match std::fs::read_to_string(path.as_ref()) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.as_ref().display(), "No state file, starting empty");
            return Ok(MemoryNodeStore::open(config));
        }
        Err(e) => return Err(StoreError::FileIo { source: e }.into()),
    };

    let serializable: SerializableStore = serde_json::from_str(&json)
        .map_err(|e| -> Error { StoreError::DeserializationFailed { source: e }.into() })?;
    if serializable.version != PERSISTENCE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: serializable.version,
            supported: PERSISTENCE_VERSION,
        }
        .into());
    }
    Ok(MemoryNodeStore::with_head(
        serializable.root,
        serializable.revision,
        config,
    ))
}
