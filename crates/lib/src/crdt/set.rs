//! The set editor.
//!
//! The current members live in the `values` property. Writers add and remove
//! members by staging scalar `add-<suffix>` and `remove-<suffix>` properties,
//! the suffix only serving to keep several operations of one commit apart.
//!
//! When the commit's walk leaves the node, the editor computes
//!
//! ```text
//! values = (existing values ∪ all additions) \ all removals
//! ```
//!
//! and writes it back as an array, even when it ends up empty. Removal is
//! applied after every addition, so removing and adding the same value in one
//! commit leaves it absent regardless of marker order.
//!
//! No tombstones are kept. A value removed by one writer can come back when a
//! concurrent writer's addition of the same value is rebased afterwards.

use tracing::debug;

use super::values::{array_property, union};
use crate::{
    Result,
    constants::{ADD_PREFIX, REMOVE_PREFIX, VALUES},
    tree::{NodeId, PropertyState, TreeBuilder},
};

/// Folds set markers of one node into its `values` property.
#[derive(Debug, Clone)]
pub struct SetEditor {
    node: NodeId,
    additions: Vec<PropertyState>,
    deletions: Vec<PropertyState>,
}

impl SetEditor {
    /// Editor for `node`, seeded with its current `values`.
    ///
    /// An empty `values` array holds nothing to seed and does not fix the
    /// element type of the set.
    pub fn new(tree: &TreeBuilder, node: NodeId) -> Self {
        let seed = tree
            .property(node, VALUES)
            .filter(|values| !values.value().values().is_empty());
        Self {
            node,
            additions: seed.cloned().into_iter().collect(),
            deletions: Vec::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Consume an added `add-*` or `remove-*` marker.
    ///
    /// Array valued properties are not markers and are left alone.
    pub fn property_added(&mut self, tree: &mut TreeBuilder, after: &PropertyState) {
        if after.is_array() {
            return;
        }
        let name = after.name();
        if name.starts_with(ADD_PREFIX) {
            self.additions.push(after.clone());
            tree.remove_property(self.node, name);
        } else if name.starts_with(REMOVE_PREFIX) {
            self.deletions.push(after.clone());
            tree.remove_property(self.node, name);
        }
    }

    /// Write the converged `values`, if anything contributed to it.
    ///
    /// # Errors
    /// Fails with a type mismatch when the contributions do not share the type
    /// of the first one (the existing `values` when non-empty).
    pub fn leave(&mut self, tree: &mut TreeBuilder) -> Result<()> {
        let Some(first) = self.additions.iter().chain(&self.deletions).next() else {
            return Ok(());
        };
        let base = first.scalar_type();

        let mut values = union(base, &self.additions)?;
        for removed in union(base, &self.deletions)? {
            values.remove(&removed);
        }

        debug!(
            added = self.additions.len(),
            removed = self.deletions.len(),
            size = values.len(),
            "Materializing set"
        );
        tree.set_property(self.node, array_property(VALUES, base, values)?);
        Ok(())
    }
}
