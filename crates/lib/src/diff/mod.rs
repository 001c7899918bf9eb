//! Tree diff traversal.
//!
//! [`walk`] compares a before and an after snapshot depth first and reports
//! every difference to an [`Editor`]. Editors receive the staging tree with
//! each callback and may rewrite it; the traversal itself always follows the
//! `after` snapshot taken before the walk started, so those rewrites never
//! change what is visited.
//!
//! For every node the order is:
//!
//! 1. `enter`
//! 2. property additions and changes, in property name order
//! 3. property deletions, in property name order
//! 4. each added, changed or deleted child, in child name order, fully walked
//!    with the editor returned for it (if any)
//! 5. `leave`
//!
//! `leave` therefore observes every property callback of its node and every
//! descendant subtree, which is where commit-time materialization belongs.

pub mod hook;

use std::sync::Arc;

pub use hook::{CommitHook, CommitInfo, EditorHook, EditorProvider};

use crate::{
    Result,
    tree::{NodeState, PropertyState, TreeBuilder},
};

/// Visitor driven by [`walk`].
///
/// All callbacks default to doing nothing. The child callbacks return the
/// editor for the child's subtree; `None` skips the subtree.
pub trait Editor: Sized {
    fn enter(&mut self, _tree: &mut TreeBuilder, _before: &NodeState, _after: &NodeState) -> Result<()> {
        Ok(())
    }

    fn leave(&mut self, _tree: &mut TreeBuilder, _before: &NodeState, _after: &NodeState) -> Result<()> {
        Ok(())
    }

    fn property_added(&mut self, _tree: &mut TreeBuilder, _after: &PropertyState) -> Result<()> {
        Ok(())
    }

    fn property_changed(
        &mut self,
        _tree: &mut TreeBuilder,
        _before: &PropertyState,
        _after: &PropertyState,
    ) -> Result<()> {
        Ok(())
    }

    fn property_deleted(&mut self, _tree: &mut TreeBuilder, _before: &PropertyState) -> Result<()> {
        Ok(())
    }

    fn child_added(
        &mut self,
        _tree: &mut TreeBuilder,
        _name: &str,
        _after: &NodeState,
    ) -> Result<Option<Self>> {
        Ok(None)
    }

    fn child_changed(
        &mut self,
        _tree: &mut TreeBuilder,
        _name: &str,
        _before: &NodeState,
        _after: &NodeState,
    ) -> Result<Option<Self>> {
        Ok(None)
    }

    fn child_deleted(
        &mut self,
        _tree: &mut TreeBuilder,
        _name: &str,
        _before: &NodeState,
    ) -> Result<Option<Self>> {
        Ok(None)
    }
}

/// Walk the differences between `before` and `after`, driving `editor`.
///
/// The first error returned by any callback aborts the walk.
pub fn walk<E: Editor>(
    editor: &mut E,
    tree: &mut TreeBuilder,
    before: &NodeState,
    after: &NodeState,
) -> Result<()> {
    editor.enter(tree, before, after)?;

    let before_props = before.property_map();
    for (name, now) in after.property_map() {
        match before_props.get(name) {
            None => editor.property_added(tree, now)?,
            Some(was) if was != now => editor.property_changed(tree, was, now)?,
            Some(_) => {}
        }
    }
    for (name, was) in before_props {
        if !after.has_property(name) {
            editor.property_deleted(tree, was)?;
        }
    }

    let empty = NodeState::new();
    let before_children = before.child_map();
    for (name, now) in after.child_map() {
        match before_children.get(name) {
            None => {
                if let Some(mut child) = editor.child_added(tree, name, now)? {
                    walk(&mut child, tree, &empty, now)?;
                }
            }
            Some(was) if !Arc::ptr_eq(was, now) && was != now => {
                if let Some(mut child) = editor.child_changed(tree, name, was, now)? {
                    walk(&mut child, tree, was, now)?;
                }
            }
            Some(_) => {}
        }
    }
    for (name, was) in before_children {
        if !after.has_child(name) {
            if let Some(mut child) = editor.child_deleted(tree, name, was)? {
                walk(&mut child, tree, was, &empty)?;
            }
        }
    }

    editor.leave(tree, before, after)
}
