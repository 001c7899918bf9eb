//! Command implementations.
//!
//! Every mutating command loads the state file, commits one session and writes
//! the state file back.

pub mod demo;
pub mod registers;
pub mod show;

use std::path::Path;

use convergent::{MemoryNodeStore, StoreConfig, tree::NodePath};

use crate::cli::Cli;

/// Load the store named by the global arguments.
pub fn open_store(cli: &Cli) -> Result<MemoryNodeStore, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::default(),
    };
    let store = MemoryNodeStore::load_from_file(&cli.state, config)?;
    tracing::debug!(state = %cli.state.display(), revision = store.revision(), "Loaded store");
    Ok(store)
}

/// Write the store back to its state file.
pub fn persist(store: &MemoryNodeStore, state: &Path) -> Result<(), Box<dyn std::error::Error>> {
    store.save_to_file(state)?;
    tracing::debug!(state = %state.display(), "Saved store");
    Ok(())
}

pub fn parse_path(path: &str) -> Result<NodePath, Box<dyn std::error::Error>> {
    Ok(path.parse::<NodePath>()?)
}
