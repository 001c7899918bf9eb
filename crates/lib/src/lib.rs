//!
//! Convergent: replicated sets and registers on top of a versioned tree store.
//!
//! Writers stage edits against a snapshot of a hierarchical property tree and
//! commit them. When writers race, the later commit is rebased onto the newer
//! head. Nodes tagged with one of the CRDT type markers converge to a
//! deterministic value no matter how those commits interleave.
//!
//! ## Core Concepts
//!
//! * **Trees (`tree::NodeState`, `tree::TreeBuilder`)**: Immutable snapshots and the mutable staging overlay of one writer.
//! * **Editors (`diff::Editor`)**: Visitors driven by a depth-first diff of a commit, able to rewrite the staged tree.
//! * **Conflict handlers (`merge::ConflictHandler`)**: Consulted during rebase when two writers touched the same property or node.
//! * **Registers (`crdt`)**: The convergent types themselves:
//!     * **Set**: `add-*` / `remove-*` markers fold into the `values` property.
//!     * **LWW register**: `update-*` markers overwrite the `value` property.
//!     * **MV register**: concurrent writes of `value` are merged into their union.
//!     * **Counter**: `increment` deltas accumulate into the `counter` property.
//! * **Store (`store::MemoryNodeStore`)**: Serializes commits, rebases stale writers and runs the commit hooks.

pub mod constants;
pub mod crdt;
pub mod diff;
pub mod merge;
pub mod store;
pub mod tree;

pub use crdt::RegisterKind;
pub use store::{CommitOutcome, MemoryNodeStore, Session, StoreConfig};
pub use tree::{NodeState, PropertyState, PropertyValue, Scalar, ScalarType};

/// Result type used throughout the convergent library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the convergent library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured tree errors from the tree module
    #[error(transparent)]
    Tree(tree::TreeError),

    /// Structured CRDT errors from the crdt module
    #[error(transparent)]
    CRDT(crdt::CRDTError),

    /// Structured rebase errors from the merge module
    #[error(transparent)]
    Merge(merge::MergeError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Tree(_) => "tree",
            Error::CRDT(_) => "crdt",
            Error::Merge(_) => "merge",
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict the rebase could not resolve.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Merge(merge_err) => merge_err.is_unresolved_conflict(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::CRDT(crdt_err) => crdt_err.is_type_error(),
            Error::Tree(tree_err) => tree_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is CRDT-related.
    pub fn is_crdt_error(&self) -> bool {
        matches!(self, Error::CRDT(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is a (de)serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Store(store_err) => store_err.is_serialization_error(),
            _ => false,
        }
    }
}
