//! The last-writer-wins register editor.
//!
//! Writers stage `update-<suffix>` properties; the last one seen in traversal
//! order becomes the register's `value` when the walk leaves the node. Across
//! commits no merge logic is needed: every update has its own marker name, so
//! concurrent writers never collide, and whichever commit the store applies
//! last wins.

use tracing::debug;

use super::values::ensure_same_type;
use crate::{
    Result,
    constants::{UPDATE_PREFIX, VALUE},
    tree::{NodeId, PropertyState, TreeBuilder},
};

/// Folds `update-*` markers of one node into its `value` property.
#[derive(Debug, Clone)]
pub struct LwwEditor {
    node: NodeId,
    pending: Option<PropertyState>,
}

impl LwwEditor {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            pending: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Capture an added `update-*` marker as the pending value.
    ///
    /// Array updates keep their shape and base type.
    ///
    /// # Errors
    /// Fails with a type mismatch when the update's type differs from the
    /// register's current value.
    pub fn property_added(&mut self, tree: &mut TreeBuilder, after: &PropertyState) -> Result<()> {
        let name = after.name();
        if !name.starts_with(UPDATE_PREFIX) {
            return Ok(());
        }
        if let Some(current) = tree.property(self.node, VALUE) {
            ensure_same_type(after, current)?;
        }
        self.pending = Some(after.clone().renamed(VALUE));
        tree.remove_property(self.node, name);
        Ok(())
    }

    /// Write the pending value, if an update was captured.
    pub fn leave(&mut self, tree: &mut TreeBuilder) {
        if let Some(value) = self.pending.take() {
            debug!(value = %value.value(), "Materializing register");
            tree.set_property(self.node, value);
        }
    }
}
