//! The multi-value register conflict handler.
//!
//! Writers set the `value` property of a `crdt:mv` node directly. Sequential
//! writes simply overwrite it. When a rebase finds that two writers changed the
//! same property concurrently, this handler keeps both: the property becomes
//! the union of the two states, always as an array, so a later writer sees a
//! uniform "the value is a set" shape and can overwrite it with a single value
//! again.
//!
//! | Collision | Resolution |
//! |-----------|------------|
//! | both added | union, `Merged` |
//! | both changed | union, `Merged` |
//! | we changed, they deleted | `Ours` |
//! | we deleted, they changed | `Theirs` |
//! | both deleted | `Merged` |
//! | any node collision | declined |
//!
//! Nodes without the `crdt:mv` marker are always declined.

use tracing::debug;

use super::{
    has_type,
    values::{array_property, ensure_same_type, union},
};
use crate::{
    Result,
    constants::MV_TYPE,
    merge::{ConflictHandler, Resolution},
    tree::{NodeBuilder, PropertyState},
};

/// Merges concurrent writes on multi-value register nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MvConflictHandler;

impl MvConflictHandler {
    pub fn new() -> Self {
        Self
    }

    /// Write the union of `ours` and `theirs` into `parent`.
    fn merge_values(
        parent: &mut NodeBuilder<'_>,
        ours: &PropertyState,
        theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        ensure_same_type(theirs, ours)?;
        let base = ours.scalar_type();
        let values = union(base, [ours, theirs])?;
        debug!(property = ours.name(), size = values.len(), "Merging concurrent register values");
        parent.set_property(array_property(ours.name(), base, values)?);
        Ok(Some(Resolution::Merged))
    }
}

impl ConflictHandler for MvConflictHandler {
    fn add_existing_property(
        &self,
        parent: &mut NodeBuilder<'_>,
        ours: &PropertyState,
        theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        if !has_type(&*parent, MV_TYPE) {
            return Ok(None);
        }
        Self::merge_values(parent, ours, theirs)
    }

    fn change_deleted_property(
        &self,
        parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(has_type(&*parent, MV_TYPE).then_some(Resolution::Ours))
    }

    fn change_changed_property(
        &self,
        parent: &mut NodeBuilder<'_>,
        ours: &PropertyState,
        theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        if !has_type(&*parent, MV_TYPE) {
            return Ok(None);
        }
        Self::merge_values(parent, ours, theirs)
    }

    fn delete_deleted_property(
        &self,
        parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(has_type(&*parent, MV_TYPE).then_some(Resolution::Merged))
    }

    fn delete_changed_property(
        &self,
        parent: &mut NodeBuilder<'_>,
        _theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        Ok(has_type(&*parent, MV_TYPE).then_some(Resolution::Theirs))
    }
}
