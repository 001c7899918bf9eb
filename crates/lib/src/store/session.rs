//! Writer sessions.
//!
//! A [`Session`] stages changes against the head it was opened on. Nothing is
//! visible to other writers until [`Session::save`] succeeds.
//!
//! Besides raw property access, a session offers helpers that stage the
//! operation markers of the register types under unique names, so that writers
//! never collide on a marker. Within one session the names sort in staging
//! order, so the last staged update of a register is the one that wins:
//!
//! ```
//! # use convergent::{MemoryNodeStore, RegisterKind, tree::NodePath};
//! # fn main() -> convergent::Result<()> {
//! let store = MemoryNodeStore::new();
//! let tags: NodePath = "/tags".parse()?;
//!
//! let mut session = store.session();
//! session.add_node(&tags)?;
//! session.add_type(&tags, RegisterKind::Set)?;
//! session.set_add(&tags, "red")?;
//! session.save()?;
//!
//! let values = store.head().node_at(&tags).and_then(|n| n.property("values").cloned());
//! assert_eq!(values.unwrap().value().to_string(), "[red]");
//! # Ok(())
//! # }
//! ```

use tracing::debug;
use uuid::Uuid;

use super::{CommitOutcome, MemoryNodeStore};
use crate::{
    Result,
    constants::{ADD_PREFIX, INCREMENT, REMOVE_PREFIX, TYPES, UPDATE_PREFIX},
    crdt::{CRDTError, RegisterKind, with_type},
    tree::{NodeId, NodePath, NodeState, PropertyState, PropertyValue, Scalar, TreeBuilder, TreeError},
};

/// One writer's view of the store.
pub struct Session<'a> {
    store: &'a MemoryNodeStore,
    id: Uuid,
    base: NodeState,
    base_revision: u64,
    tree: TreeBuilder,
    /// Staging counter for marker names
    sequence: u64,
}

impl<'a> Session<'a> {
    pub(crate) fn new(store: &'a MemoryNodeStore, base: NodeState, base_revision: u64) -> Self {
        Self {
            store,
            id: Uuid::new_v4(),
            tree: TreeBuilder::new(base.clone()),
            base,
            base_revision,
            sequence: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The head revision this session's changes are staged against
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    /// Snapshot of the staged tree
    pub fn root(&self) -> NodeState {
        self.tree.build()
    }

    /// Snapshot of the staged node at `path`
    pub fn node(&self, path: &NodePath) -> Option<NodeState> {
        self.tree.resolve(path).map(|id| self.tree.node_state(id))
    }

    pub fn has_node(&self, path: &NodePath) -> bool {
        self.tree.resolve(path).is_some()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.tree.build() != self.base
    }

    /// Create the node at `path` along with any missing ancestors.
    pub fn add_node(&mut self, path: &NodePath) -> Result<()> {
        let mut id = self.tree.root();
        for name in path.components() {
            id = self.tree.child_or_add(id, name);
        }
        Ok(())
    }

    /// Tag the node at `path` with the marker of `kind`.
    pub fn add_type(&mut self, path: &NodePath, kind: RegisterKind) -> Result<()> {
        let id = self.existing(path)?;
        let types = with_type(self.tree.property(id, TYPES), kind.marker());
        self.tree.set_property(id, types);
        Ok(())
    }

    /// The register kinds the staged node at `path` is tagged with
    pub fn types(&self, path: &NodePath) -> Result<Vec<RegisterKind>> {
        let id = self.existing(path)?;
        Ok(self
            .tree
            .property(id, TYPES)
            .map(RegisterKind::listed_in)
            .unwrap_or_default())
    }

    /// The staged property `name` of the node at `path`
    pub fn property(&self, path: &NodePath, name: &str) -> Option<PropertyState> {
        let id = self.tree.resolve(path)?;
        self.tree.property(id, name).cloned()
    }

    pub fn set_property(&mut self, path: &NodePath, property: PropertyState) -> Result<()> {
        let id = self.existing(path)?;
        self.tree.set_property(id, property);
        Ok(())
    }

    pub fn remove_property(&mut self, path: &NodePath, name: &str) -> Result<Option<PropertyState>> {
        let id = self.existing(path)?;
        Ok(self.tree.remove_property(id, name))
    }

    /// Remove the node at `path` and its subtree.
    ///
    /// Returns whether a node was removed. The root cannot be removed.
    pub fn remove_node(&mut self, path: &NodePath) -> Result<bool> {
        let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
            return Err(TreeError::InvalidPath {
                path: path.to_string(),
                reason: "the root node cannot be removed".to_string(),
            }
            .into());
        };
        let parent = self.existing(&parent)?;
        Ok(self.tree.remove_child(parent, name))
    }

    /// Stage the addition of `value` to the set at `path`.
    ///
    /// Returns the name of the staged marker.
    pub fn set_add(&mut self, path: &NodePath, value: impl Into<Scalar>) -> Result<String> {
        self.stage_marker(path, ADD_PREFIX, PropertyValue::Single(value.into()))
    }

    /// Stage the removal of `value` from the set at `path`.
    pub fn set_remove(&mut self, path: &NodePath, value: impl Into<Scalar>) -> Result<String> {
        self.stage_marker(path, REMOVE_PREFIX, PropertyValue::Single(value.into()))
    }

    /// Stage a write of the last-writer-wins register at `path`.
    pub fn register_update(&mut self, path: &NodePath, value: impl Into<PropertyValue>) -> Result<String> {
        self.stage_marker(path, UPDATE_PREFIX, value.into())
    }

    /// Stage adding `delta` to the counter at `path`.
    ///
    /// Several increments staged in one session are summed.
    pub fn counter_increment(&mut self, path: &NodePath, delta: i64) -> Result<()> {
        let id = self.existing(path)?;
        let staged = match self.tree.property(id, INCREMENT) {
            Some(existing) => existing
                .value()
                .as_scalar()
                .and_then(Scalar::as_long)
                .and_then(|current| current.checked_add(delta))
                .ok_or_else(|| CRDTError::Overflow {
                    property: INCREMENT.to_string(),
                })?,
            None => delta,
        };
        self.tree.set_property(id, PropertyState::new(INCREMENT, staged));
        Ok(())
    }

    /// Commit the staged changes.
    ///
    /// On success the session continues from the new head. On failure the
    /// head is unchanged and the staged changes are kept.
    pub fn save(&mut self) -> Result<CommitOutcome> {
        let outcome = self
            .store
            .merge(self.id, &self.base, self.base_revision, &self.tree)?;
        self.reset(outcome.root.clone(), outcome.revision);
        Ok(outcome)
    }

    /// Drop the staged changes and move to the current head.
    pub fn refresh(&mut self) {
        let (root, revision) = self.store.head_with_revision();
        debug!(session_id = %self.id, revision, "Refreshing session");
        self.reset(root, revision);
    }

    fn reset(&mut self, root: NodeState, revision: u64) {
        self.tree = TreeBuilder::new(root.clone());
        self.base = root;
        self.base_revision = revision;
    }

    fn existing(&self, path: &NodePath) -> Result<NodeId> {
        self.tree.resolve(path).ok_or_else(|| {
            TreeError::NodeNotFound {
                path: path.to_string(),
            }
            .into()
        })
    }

    fn stage_marker(&mut self, path: &NodePath, prefix: &str, value: PropertyValue) -> Result<String> {
        let id = self.existing(path)?;
        self.sequence += 1;
        let name = format!("{prefix}{:020}-{}", self.sequence, Uuid::new_v4());
        self.tree.set_property(id, PropertyState::new(name.as_str(), value));
        Ok(name)
    }
}
