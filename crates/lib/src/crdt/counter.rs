//! The atomic counter editor.
//!
//! A writer stages a Long `increment` property; on commit it is added to the
//! node's `counter` (absent counts as zero) and removed. A concurrent writer's
//! increment is rebased onto the latest head and therefore lands on top of the
//! latest total.

use tracing::debug;

use super::errors::CRDTError;
use crate::{
    Result,
    constants::{COUNTER, INCREMENT},
    tree::{NodeId, PropertyState, TreeBuilder},
};

/// Folds the `increment` property of one node into its `counter`.
#[derive(Debug, Clone)]
pub struct CounterEditor {
    node: NodeId,
}

impl CounterEditor {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Apply an added or changed `increment`.
    ///
    /// # Errors
    /// Fails when the increment or the stored counter is not a single Long, or
    /// when the sum overflows.
    pub fn property_set(&mut self, tree: &mut TreeBuilder, after: &PropertyState) -> Result<()> {
        if after.name() != INCREMENT {
            return Ok(());
        }
        let delta = long_of(after)?;
        let current = match tree.property(self.node, COUNTER) {
            Some(counter) => long_of(counter)?,
            None => 0,
        };
        let total = current
            .checked_add(delta)
            .ok_or_else(|| CRDTError::Overflow {
                property: COUNTER.to_string(),
            })?;

        debug!(delta, total, "Applying counter increment");
        tree.set_property(self.node, PropertyState::new(COUNTER, total));
        tree.remove_property(self.node, INCREMENT);
        Ok(())
    }
}

fn long_of(property: &PropertyState) -> std::result::Result<i64, CRDTError> {
    property
        .value()
        .as_scalar()
        .and_then(|s| s.as_long())
        .ok_or_else(|| CRDTError::mismatch(property.name(), "Long", property.value()))
}
