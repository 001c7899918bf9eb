//! Commit-time dispatch to the register editors.
//!
//! [`RegisterEditorProvider`] is installed as a commit hook. Its
//! [`RegisterEditor`] follows every added or changed subtree of a commit and,
//! on each node, delegates to the editor of the register kind the node is
//! tagged with. Untagged nodes get an inert editor that only descends.

use tracing::warn;

use super::{CounterEditor, CrdtConfig, LwwEditor, RegisterKind, SetEditor};
use crate::{
    Result,
    constants::TYPES,
    diff::{CommitInfo, Editor, EditorProvider},
    tree::{NodeId, NodeState, PropertyState, TreeBuilder},
};

#[derive(Debug, Clone)]
enum Behavior {
    Set(SetEditor),
    Lww(LwwEditor),
    Counter(CounterEditor),
    Inert,
}

/// The editor for one staged node.
#[derive(Debug, Clone)]
pub struct RegisterEditor {
    node: NodeId,
    enabled: CrdtConfig,
    behavior: Behavior,
}

impl RegisterEditor {
    /// Pick the behaviour for `node` from its `crdt:types` marker.
    ///
    /// A node tagged with more than one editor kind is handled by the first of
    /// set, LWW and counter; the others are ignored.
    pub fn for_node(tree: &TreeBuilder, node: NodeId, enabled: CrdtConfig) -> Self {
        let kinds: Vec<RegisterKind> = match tree.property(node, TYPES) {
            Some(types) => RegisterKind::listed_in(types)
                .into_iter()
                .filter(|kind| *kind != RegisterKind::Mv && enabled.is_enabled(*kind))
                .collect(),
            None => Vec::new(),
        };
        if kinds.len() > 1 {
            warn!(?kinds, chosen = %kinds[0], "Node carries several register types");
        }

        let behavior = match kinds.first() {
            Some(RegisterKind::Set) => Behavior::Set(SetEditor::new(tree, node)),
            Some(RegisterKind::Lww) => Behavior::Lww(LwwEditor::new(node)),
            Some(RegisterKind::Counter) => Behavior::Counter(CounterEditor::new(node)),
            Some(RegisterKind::Mv) | None => Behavior::Inert,
        };
        Self {
            node,
            enabled,
            behavior,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The register kind applied to this node, if any
    pub fn kind(&self) -> Option<RegisterKind> {
        match self.behavior {
            Behavior::Set(_) => Some(RegisterKind::Set),
            Behavior::Lww(_) => Some(RegisterKind::Lww),
            Behavior::Counter(_) => Some(RegisterKind::Counter),
            Behavior::Inert => None,
        }
    }

    fn descend(&self, tree: &TreeBuilder, name: &str) -> Option<Self> {
        tree.child(self.node, name)
            .map(|child| Self::for_node(tree, child, self.enabled))
    }
}

impl Editor for RegisterEditor {
    fn leave(&mut self, tree: &mut TreeBuilder, _before: &NodeState, _after: &NodeState) -> Result<()> {
        match &mut self.behavior {
            Behavior::Set(set) => set.leave(tree),
            Behavior::Lww(lww) => {
                lww.leave(tree);
                Ok(())
            }
            Behavior::Counter(_) | Behavior::Inert => Ok(()),
        }
    }

    fn property_added(&mut self, tree: &mut TreeBuilder, after: &PropertyState) -> Result<()> {
        match &mut self.behavior {
            Behavior::Set(set) => {
                set.property_added(tree, after);
                Ok(())
            }
            Behavior::Lww(lww) => lww.property_added(tree, after),
            Behavior::Counter(counter) => counter.property_set(tree, after),
            Behavior::Inert => Ok(()),
        }
    }

    fn property_changed(
        &mut self,
        tree: &mut TreeBuilder,
        _before: &PropertyState,
        after: &PropertyState,
    ) -> Result<()> {
        match &mut self.behavior {
            Behavior::Counter(counter) => counter.property_set(tree, after),
            _ => Ok(()),
        }
    }

    fn child_added(&mut self, tree: &mut TreeBuilder, name: &str, _after: &NodeState) -> Result<Option<Self>> {
        Ok(self.descend(tree, name))
    }

    fn child_changed(
        &mut self,
        tree: &mut TreeBuilder,
        name: &str,
        _before: &NodeState,
        _after: &NodeState,
    ) -> Result<Option<Self>> {
        Ok(self.descend(tree, name))
    }
}

/// Hands out a [`RegisterEditor`] for the root of every commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterEditorProvider {
    enabled: CrdtConfig,
}

impl RegisterEditorProvider {
    pub fn new(enabled: CrdtConfig) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> CrdtConfig {
        self.enabled
    }
}

impl EditorProvider for RegisterEditorProvider {
    type Editor = RegisterEditor;

    fn root_editor(
        &self,
        _before: &NodeState,
        _after: &NodeState,
        tree: &TreeBuilder,
        _info: &CommitInfo,
    ) -> Option<RegisterEditor> {
        self.enabled
            .has_editors()
            .then(|| RegisterEditor::for_node(tree, tree.root(), self.enabled))
    }
}
