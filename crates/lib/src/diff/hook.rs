//! Commit hooks.
//!
//! The store runs every registered [`CommitHook`] on the staged tree of a
//! commit before it becomes the new head. [`EditorHook`] adapts an
//! [`EditorProvider`] into a hook by walking the diff between the current head
//! and the staged tree.

use uuid::Uuid;

use super::{Editor, walk};
use crate::{
    Result,
    tree::{NodeState, TreeBuilder},
};

/// Context of the commit being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Session that produced the commit
    pub session_id: Uuid,
    /// Head revision the session's changes were staged against
    pub base_revision: u64,
    /// Whether the changes were rebased onto a newer head first
    pub rebased: bool,
}

/// Processes the staged tree of every commit.
///
/// Returning an error fails the commit; the head is left untouched.
pub trait CommitHook: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Inspect and rewrite `tree`, which is about to replace `before`.
    fn process(&self, before: &NodeState, tree: &mut TreeBuilder, info: &CommitInfo) -> Result<()>;
}

/// Creates the root [`Editor`] of a commit.
pub trait EditorProvider: Send + Sync {
    type Editor: Editor;

    /// The editor for the root node, or `None` to skip the walk.
    fn root_editor(
        &self,
        before: &NodeState,
        after: &NodeState,
        tree: &TreeBuilder,
        info: &CommitInfo,
    ) -> Option<Self::Editor>;
}

/// Runs the editors of an [`EditorProvider`] as a [`CommitHook`].
pub struct EditorHook<P> {
    name: String,
    provider: P,
}

impl<P: EditorProvider> EditorHook<P> {
    pub fn new(name: impl Into<String>, provider: P) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: EditorProvider> CommitHook for EditorHook<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, before: &NodeState, tree: &mut TreeBuilder, info: &CommitInfo) -> Result<()> {
        let after = tree.build();
        match self.provider.root_editor(before, &after, tree, info) {
            Some(mut editor) => walk(&mut editor, tree, before, &after),
            None => Ok(()),
        }
    }
}
