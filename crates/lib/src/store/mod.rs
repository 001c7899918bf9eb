//! An in-memory versioned tree store.
//!
//! The store keeps a single head snapshot and a revision number. Writers open a
//! [`Session`], stage changes against the head they saw, and save. Saving goes
//! through one pipeline, serialized by the head lock:
//!
//! 1. If the head moved since the session's base, the session's changes are
//!    rebased onto it, consulting the registered conflict handlers.
//! 2. Every commit hook runs on the staged result, with the current head as
//!    `before`.
//! 3. The result becomes the new head. The revision only moves when the tree
//!    actually changed.
//!
//! A failure anywhere leaves the head as it was.

pub mod config;
pub mod errors;
mod persistence;
pub mod session;

use std::{
    fmt,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use config::StoreConfig;
pub use errors::StoreError;
pub use session::Session;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    Result,
    crdt::{MvConflictHandler, RegisterEditorProvider},
    diff::{CommitHook, CommitInfo, EditorHook},
    merge::{self, ConflictHandler},
    tree::{NodeState, TreeBuilder},
};

struct Head {
    root: NodeState,
    revision: u64,
}

/// What a successful save produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// The head after the commit
    pub root: NodeState,
    /// The head revision after the commit
    pub revision: u64,
    /// Whether the changes had to be rebased onto a newer head
    pub rebased: bool,
    /// Whether the commit changed the tree
    pub changed: bool,
}

/// A versioned tree held in memory.
///
/// Share it between threads behind an [`Arc`]; every method takes `&self`.
pub struct MemoryNodeStore {
    head: Mutex<Head>,
    hooks: Vec<Arc<dyn CommitHook>>,
    handlers: Vec<Arc<dyn ConflictHandler>>,
    config: StoreConfig,
}

impl MemoryNodeStore {
    /// An empty store with the default configuration.
    pub fn new() -> Self {
        Self::open(StoreConfig::default())
    }

    /// An empty store with the register editors and handlers `config` enables.
    pub fn open(config: StoreConfig) -> Self {
        Self::with_head(NodeState::new(), 0, config)
    }

    /// A store starting from an existing snapshot.
    pub fn with_head(root: NodeState, revision: u64, config: StoreConfig) -> Self {
        let mut store = Self {
            head: Mutex::new(Head { root, revision }),
            hooks: Vec::new(),
            handlers: Vec::new(),
            config,
        };
        if config.crdt.has_editors() {
            store.hooks.push(Arc::new(EditorHook::new(
                "registers",
                RegisterEditorProvider::new(config.crdt),
            )));
        }
        if config.crdt.mv {
            store.handlers.push(Arc::new(MvConflictHandler::new()));
        }
        store
    }

    /// Append a commit hook; hooks run in registration order.
    pub fn with_hook(mut self, hook: Arc<dyn CommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Append a conflict handler; handlers are asked in registration order.
    pub fn with_conflict_handler(mut self, handler: Arc<dyn ConflictHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The current head snapshot.
    pub fn head(&self) -> NodeState {
        self.lock_head().root.clone()
    }

    /// The current head revision.
    pub fn revision(&self) -> u64 {
        self.lock_head().revision
    }

    /// The head snapshot together with its revision, read atomically.
    pub fn head_with_revision(&self) -> (NodeState, u64) {
        let head = self.lock_head();
        (head.root.clone(), head.revision)
    }

    /// Open a writer on the current head.
    pub fn session(&self) -> Session<'_> {
        let (root, revision) = self.head_with_revision();
        Session::new(self, root, revision)
    }

    /// Saves the head snapshot to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path)
    }

    /// Loads a store from a JSON file written by [`save_to_file`](Self::save_to_file).
    ///
    /// If the file does not exist, an empty store is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        persistence::load_from_file(path, config)
    }

    /// Commit `staged`, which was built on `base` at `base_revision`.
    pub(crate) fn merge(
        &self,
        session_id: Uuid,
        base: &NodeState,
        base_revision: u64,
        staged: &TreeBuilder,
    ) -> Result<CommitOutcome> {
        let mut head = self.lock_head();
        let ours = staged.build();
        let rebased = head.revision != base_revision;

        let mut tree = if rebased {
            debug!(
                %session_id,
                base_revision,
                head_revision = head.revision,
                "Rebasing session onto newer head"
            );
            merge::rebase(
                base,
                &ours,
                &head.root,
                &self.handlers,
                self.config.conflict_policy,
            )?
        } else {
            TreeBuilder::new(ours)
        };

        let info = CommitInfo {
            session_id,
            base_revision,
            rebased,
        };
        for hook in &self.hooks {
            debug!(hook = hook.name(), "Running commit hook");
            hook.process(&head.root, &mut tree, &info)?;
        }

        let root = tree.build();
        let changed = root != head.root;
        if changed {
            head.root = root;
            head.revision += 1;
            info!(revision = head.revision, rebased, "Committed");
        } else {
            debug!(revision = head.revision, "Nothing to commit");
        }

        Ok(CommitOutcome {
            root: head.root.clone(),
            revision: head.revision,
            rebased,
            changed,
        })
    }

    fn lock_head(&self) -> MutexGuard<'_, Head> {
        // A panicking hook cannot leave the head half-written: it is only
        // replaced after every hook succeeded.
        self.head.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryNodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNodeStore")
            .field("revision", &self.revision())
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .field("handlers", &self.handlers.len())
            .field("config", &self.config)
            .finish()
    }
}
