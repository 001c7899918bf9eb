//! Rebasing a writer's changes onto a newer head.
//!
//! When a writer commits after someone else already moved the head, its
//! changes (`base -> ours`) are replayed on top of the head (`theirs`). Most
//! changes apply cleanly. A change that collides with a concurrent change to
//! the same property or child is a [`Conflict`], and the registered
//! [`ConflictHandler`]s are asked, in order, how to resolve it.
//!
//! Identical concurrent changes are never conflicts.

pub mod errors;

use std::{fmt, sync::Arc};

pub use errors::MergeError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Result,
    tree::{NodeBuilder, NodeId, NodePath, NodeState, PropertyState, TreeBuilder},
};

/// How a conflict was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Apply the rebasing writer's change
    Ours,
    /// Keep the already committed change
    Theirs,
    /// The handler wrote the merged state into the staging parent itself
    Merged,
    /// Keep the already committed change and do not report the conflict
    Ignored,
}

/// The structural collision categories a rebase distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Both writers added a property of the same name with different values
    AddExistingProperty,
    /// We changed a property they deleted
    ChangeDeletedProperty,
    /// Both writers changed a property to different values
    ChangeChangedProperty,
    /// Both writers deleted a property
    DeleteDeletedProperty,
    /// We deleted a property they changed
    DeleteChangedProperty,
    /// Both writers added a child of the same name with different content
    AddExistingNode,
    /// We changed a child they deleted
    ChangeDeletedNode,
    /// We deleted a child they changed
    DeleteChangedNode,
    /// Both writers deleted a child
    DeleteDeletedNode,
}

impl ConflictKind {
    pub fn is_property(&self) -> bool {
        matches!(
            self,
            ConflictKind::AddExistingProperty
                | ConflictKind::ChangeDeletedProperty
                | ConflictKind::ChangeChangedProperty
                | ConflictKind::DeleteDeletedProperty
                | ConflictKind::DeleteChangedProperty
        )
    }

    /// Both sides agree on the outcome, so declining it is never an error.
    fn is_benign(&self) -> bool {
        matches!(
            self,
            ConflictKind::DeleteDeletedProperty | ConflictKind::DeleteDeletedNode
        )
    }

    fn label(&self) -> &'static str {
        match self {
            ConflictKind::AddExistingProperty | ConflictKind::AddExistingNode => "add-existing",
            ConflictKind::ChangeDeletedProperty | ConflictKind::ChangeDeletedNode => {
                "change-deleted"
            }
            ConflictKind::ChangeChangedProperty => "change-changed",
            ConflictKind::DeleteDeletedProperty | ConflictKind::DeleteDeletedNode => {
                "delete-deleted"
            }
            ConflictKind::DeleteChangedProperty | ConflictKind::DeleteChangedNode => {
                "delete-changed"
            }
        }
    }
}

/// A collision no handler resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Path of the parent node
    pub path: NodePath,
    /// Name of the property or child
    pub name: String,
    pub kind: ConflictKind,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = if self.kind.is_property() {
            "property"
        } else {
            "node"
        };
        write!(
            f,
            "{} {what} '{}' at {}",
            self.kind.label(),
            self.name,
            self.path
        )
    }
}

/// What to do with a conflict every handler declined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Fail the commit, reporting every unresolved conflict
    #[default]
    Fail,
    /// Apply the rebasing writer's change
    Ours,
    /// Keep the already committed change
    Theirs,
}

/// Resolves collisions found while rebasing.
///
/// Each method receives the staging parent of the collision, which already
/// holds the committed state. Returning `Ok(None)` declines, handing the
/// conflict to the next handler and finally to the [`ConflictPolicy`].
/// Returning [`Resolution::Merged`] promises the handler wrote the merged state
/// into `parent`. Every method declines by default.
pub trait ConflictHandler: Send + Sync {
    fn add_existing_property(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
        _theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn change_deleted_property(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn change_changed_property(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
        _theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn delete_deleted_property(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn delete_changed_property(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn add_existing_node(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _name: &str,
        _ours: &NodeState,
        _theirs: &NodeState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn change_deleted_node(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _name: &str,
        _ours: &NodeState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn delete_changed_node(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _name: &str,
        _theirs: &NodeState,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    fn delete_deleted_node(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _name: &str,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }
}

/// Replay `base -> ours` on top of `head`.
///
/// Returns the staging tree of the rebased result. Collisions go through
/// `handlers` in order; the first handler that does not decline decides.
///
/// # Errors
/// Fails with [`MergeError::UnresolvedConflicts`] when `policy` is
/// [`ConflictPolicy::Fail`] and some conflict was declined by every handler,
/// and propagates any error a handler returns.
pub fn rebase(
    base: &NodeState,
    ours: &NodeState,
    head: &NodeState,
    handlers: &[Arc<dyn ConflictHandler>],
    policy: ConflictPolicy,
) -> Result<TreeBuilder> {
    let mut tree = TreeBuilder::new(head.clone());
    let mut rebaser = Rebaser {
        handlers,
        policy,
        conflicts: Vec::new(),
    };
    let root = tree.root();
    rebaser.apply(&mut tree, root, &NodePath::root(), base, ours)?;

    if rebaser.conflicts.is_empty() {
        Ok(tree)
    } else {
        warn!(
            count = rebaser.conflicts.len(),
            "Rebase left unresolved conflicts"
        );
        Err(MergeError::UnresolvedConflicts {
            conflicts: rebaser.conflicts,
        }
        .into())
    }
}

struct Rebaser<'a> {
    handlers: &'a [Arc<dyn ConflictHandler>],
    policy: ConflictPolicy,
    conflicts: Vec<Conflict>,
}

impl Rebaser<'_> {
    /// Apply the changes between `base` and `ours` to the staged node `id`.
    fn apply(
        &mut self,
        tree: &mut TreeBuilder,
        id: NodeId,
        path: &NodePath,
        base: &NodeState,
        ours: &NodeState,
    ) -> Result<()> {
        self.apply_properties(tree, id, path, base, ours)?;
        self.apply_children(tree, id, path, base, ours)
    }

    fn apply_properties(
        &mut self,
        tree: &mut TreeBuilder,
        id: NodeId,
        path: &NodePath,
        base: &NodeState,
        ours: &NodeState,
    ) -> Result<()> {
        for (name, mine) in ours.property_map() {
            let theirs = tree.property(id, name).cloned();
            match (base.property(name), theirs) {
                (None, None) => {
                    tree.set_property(id, mine.clone());
                }
                (Some(was), Some(theirs)) if theirs == *was && was != mine => {
                    tree.set_property(id, mine.clone());
                }
                (_, Some(theirs)) if theirs == *mine => {}
                (Some(was), _) if was == mine => {}
                (None, Some(theirs)) => {
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::AddExistingProperty,
                        |h, parent| h.add_existing_property(parent, mine, &theirs),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.set_property(id, mine.clone());
                    }
                }
                (Some(_), Some(theirs)) => {
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::ChangeChangedProperty,
                        |h, parent| h.change_changed_property(parent, mine, &theirs),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.set_property(id, mine.clone());
                    }
                }
                (Some(_), None) => {
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::ChangeDeletedProperty,
                        |h, parent| h.change_deleted_property(parent, mine),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.set_property(id, mine.clone());
                    }
                }
            }
        }

        for (name, was) in base.property_map() {
            if ours.has_property(name) {
                continue;
            }
            match tree.property(id, name).cloned() {
                Some(theirs) if theirs == *was => {
                    tree.remove_property(id, name);
                }
                Some(theirs) => {
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::DeleteChangedProperty,
                        |h, parent| h.delete_changed_property(parent, &theirs),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.remove_property(id, name);
                    }
                }
                None => {
                    self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::DeleteDeletedProperty,
                        |h, parent| h.delete_deleted_property(parent, was),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn apply_children(
        &mut self,
        tree: &mut TreeBuilder,
        id: NodeId,
        path: &NodePath,
        base: &NodeState,
        ours: &NodeState,
    ) -> Result<()> {
        for (name, mine) in ours.children() {
            match (base.child(name), tree.child(id, name)) {
                (None, None) => {
                    tree.set_child(id, name, mine);
                }
                (None, Some(existing)) => {
                    let theirs = tree.node_state(existing);
                    if theirs == *mine {
                        continue;
                    }
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::AddExistingNode,
                        |h, parent| h.add_existing_node(parent, name, mine, &theirs),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.set_child(id, name, mine);
                    }
                }
                (Some(was), _) if was == mine => {}
                (Some(was), Some(existing)) => {
                    let child_path = path.child(name)?;
                    self.apply(tree, existing, &child_path, was, mine)?;
                }
                (Some(_), None) => {
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::ChangeDeletedNode,
                        |h, parent| h.change_deleted_node(parent, name, mine),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.set_child(id, name, mine);
                    }
                }
            }
        }

        for (name, was) in base.children() {
            if ours.has_child(name) {
                continue;
            }
            match tree.child(id, name) {
                Some(existing) => {
                    let theirs = tree.node_state(existing);
                    if theirs == *was {
                        tree.remove_child(id, name);
                        continue;
                    }
                    let resolution = self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::DeleteChangedNode,
                        |h, parent| h.delete_changed_node(parent, name, &theirs),
                    )?;
                    if resolution == Resolution::Ours {
                        tree.remove_child(id, name);
                    }
                }
                None => {
                    self.resolve(
                        tree,
                        id,
                        path,
                        name,
                        ConflictKind::DeleteDeletedNode,
                        |h, parent| h.delete_deleted_node(parent, name),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Run the handler chain for one conflict, falling back to the policy.
    fn resolve<F>(
        &mut self,
        tree: &mut TreeBuilder,
        id: NodeId,
        path: &NodePath,
        name: &str,
        kind: ConflictKind,
        ask: F,
    ) -> Result<Resolution>
    where
        F: Fn(&dyn ConflictHandler, &mut NodeBuilder<'_>) -> Result<Option<Resolution>>,
    {
        for handler in self.handlers {
            let mut parent = tree.node(id);
            if let Some(resolution) = ask(handler.as_ref(), &mut parent)? {
                debug!(%path, name, ?kind, ?resolution, "Conflict resolved by handler");
                return Ok(resolution);
            }
        }

        if kind.is_benign() {
            return Ok(Resolution::Theirs);
        }
        match self.policy {
            ConflictPolicy::Fail => {
                self.conflicts.push(Conflict {
                    path: path.clone(),
                    name: name.to_string(),
                    kind,
                });
                Ok(Resolution::Theirs)
            }
            ConflictPolicy::Ours => Ok(Resolution::Ours),
            ConflictPolicy::Theirs => Ok(Resolution::Theirs),
        }
    }
}
