//! Store configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::StoreError;
use crate::{Result, crdt::CrdtConfig, merge::ConflictPolicy};

/// Settings of a [`MemoryNodeStore`](super::MemoryNodeStore).
///
/// Every field has a default, so `{}` is a valid configuration file:
///
/// ```json
/// {
///   "conflict_policy": "fail",
///   "crdt": { "set": true, "lww": true, "mv": true, "counter": true }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// What to do with conflicts no handler resolves
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    /// Which register kinds are active
    #[serde(default)]
    pub crdt: CrdtConfig,
}

impl StoreConfig {
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_crdt(mut self, crdt: CrdtConfig) -> Self {
        self.crdt = crdt;
        self
    }

    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    /// Fails with [`StoreError::FileIo`] when the file cannot be read and with
    /// [`StoreError::InvalidConfig`] when it does not parse.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::FileIo { source })?;
        let config = serde_json::from_str(&json).map_err(|e| StoreError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }
}
