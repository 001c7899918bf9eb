//! The staging tree of a single writer.
//!
//! A [`TreeBuilder`] copies a base snapshot into an arena of mutable nodes
//! addressed by [`NodeId`]. Editors and conflict handlers never hold a
//! reference into the tree across calls; they hold a `NodeId` and are handed
//! the builder explicitly for each callback.

use std::{collections::BTreeMap, sync::Arc};

use super::{PropertySource, path::NodePath, state::NodeState, value::PropertyState};

/// Handle of a node inside one [`TreeBuilder`].
///
/// Ids are only meaningful for the builder that produced them. Removing a node
/// detaches it from its parent but leaves its id valid, so a stale handle reads
/// and writes a node that is no longer part of the built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct StagedNode {
    properties: BTreeMap<String, PropertyState>,
    children: BTreeMap<String, NodeId>,
    /// Snapshot the node was loaded from
    origin: Arc<NodeState>,
    /// Whether the node's own properties or child set were touched
    dirty: bool,
}

/// Mutable staging overlay on top of a base snapshot.
///
/// # Panics
///
/// Every method taking a [`NodeId`] panics if the id was not handed out by
/// this builder and lies outside its arena. Use [`contains`](Self::contains)
/// to check an id of unknown origin.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    base: NodeState,
    nodes: Vec<StagedNode>,
}

impl TreeBuilder {
    /// Start staging changes on top of `base`.
    pub fn new(base: NodeState) -> Self {
        let mut builder = Self {
            base: NodeState::new(),
            nodes: Vec::new(),
        };
        builder.load(&Arc::new(base.clone()));
        builder.base = base;
        builder
    }

    /// The snapshot this builder was created from
    pub fn base(&self) -> &NodeState {
        &self.base
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Whether `id` addresses a node of this builder's arena
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Copy `state` into the arena and return the id of its top node.
    fn load(&mut self, state: &Arc<NodeState>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(StagedNode {
            properties: state.property_map().clone(),
            children: BTreeMap::new(),
            origin: Arc::clone(state),
            dirty: false,
        });
        for (name, child) in state.child_map() {
            let child_id = self.load(child);
            self.nodes[id.0].children.insert(name.clone(), child_id);
        }
        id
    }

    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id.0].children.get(name).copied()
    }

    pub fn has_child(&self, id: NodeId, name: &str) -> bool {
        self.nodes[id.0].children.contains_key(name)
    }

    pub fn child_names(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.nodes[id.0].children.keys().map(String::as_str)
    }

    /// Resolve an absolute path to a staged node
    pub fn resolve(&self, path: &NodePath) -> Option<NodeId> {
        path.components()
            .try_fold(self.root(), |id, name| self.child(id, name))
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&PropertyState> {
        self.nodes[id.0].properties.get(name)
    }

    pub fn properties(&self, id: NodeId) -> impl Iterator<Item = &PropertyState> {
        self.nodes[id.0].properties.values()
    }

    /// Set a property, returning the previous state under the same name.
    pub fn set_property(&mut self, id: NodeId, property: PropertyState) -> Option<PropertyState> {
        let node = &mut self.nodes[id.0];
        node.dirty = true;
        node.properties.insert(property.name().to_string(), property)
    }

    pub fn remove_property(&mut self, id: NodeId, name: &str) -> Option<PropertyState> {
        let node = &mut self.nodes[id.0];
        let removed = node.properties.remove(name);
        node.dirty |= removed.is_some();
        removed
    }

    /// Add an empty child, replacing any existing child of the same name.
    pub fn add_child(&mut self, id: NodeId, name: &str) -> NodeId {
        self.set_child(id, name, &NodeState::new())
    }

    /// The existing child `name`, or a new empty one.
    pub fn child_or_add(&mut self, id: NodeId, name: &str) -> NodeId {
        match self.child(id, name) {
            Some(child) => child,
            None => self.add_child(id, name),
        }
    }

    /// Replace the child `name` with a copy of `state`.
    pub fn set_child(&mut self, id: NodeId, name: &str, state: &NodeState) -> NodeId {
        let child = self.load(&Arc::new(state.clone()));
        let node = &mut self.nodes[id.0];
        node.dirty = true;
        node.children.insert(name.to_string(), child);
        child
    }

    /// Detach the child `name`. Returns whether it existed.
    pub fn remove_child(&mut self, id: NodeId, name: &str) -> bool {
        let node = &mut self.nodes[id.0];
        let removed = node.children.remove(name).is_some();
        node.dirty |= removed;
        removed
    }

    /// Scoped access to one node
    pub fn node(&mut self, id: NodeId) -> NodeBuilder<'_> {
        NodeBuilder { tree: self, id }
    }

    /// Snapshot of the staged subtree rooted at `id`.
    pub fn node_state(&self, id: NodeId) -> NodeState {
        NodeState::clone(&self.snapshot(id))
    }

    /// Untouched subtrees come back as the `Arc` they were loaded from.
    fn snapshot(&self, id: NodeId) -> Arc<NodeState> {
        let node = &self.nodes[id.0];
        let children: BTreeMap<String, Arc<NodeState>> = node
            .children
            .iter()
            .map(|(name, child)| (name.clone(), self.snapshot(*child)))
            .collect();

        let unchanged = !node.dirty
            && children.iter().all(|(name, child)| {
                node.origin
                    .child_map()
                    .get(name)
                    .is_some_and(|was| Arc::ptr_eq(was, child))
            });
        if unchanged {
            Arc::clone(&node.origin)
        } else {
            Arc::new(NodeState::from_parts(node.properties.clone(), children))
        }
    }

    /// Snapshot of the whole staged tree
    pub fn build(&self) -> NodeState {
        self.node_state(self.root())
    }

    /// Whether the staged tree differs from its base
    pub fn is_modified(&self) -> bool {
        self.build() != self.base
    }
}

/// Node-scoped view of a [`TreeBuilder`].
///
/// This is the "staging parent" handed to conflict handlers: it can read and
/// rewrite the properties and children of exactly one node.
pub struct NodeBuilder<'a> {
    tree: &'a mut TreeBuilder,
    id: NodeId,
}

impl NodeBuilder<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn property(&self, name: &str) -> Option<&PropertyState> {
        self.tree.property(self.id, name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyState> {
        self.tree.properties(self.id)
    }

    pub fn set_property(&mut self, property: PropertyState) -> Option<PropertyState> {
        self.tree.set_property(self.id, property)
    }

    pub fn remove_property(&mut self, name: &str) -> Option<PropertyState> {
        self.tree.remove_property(self.id, name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.tree.has_child(self.id, name)
    }

    /// Descend into the child `name`, creating it if needed.
    pub fn child_or_add(&mut self, name: &str) -> NodeBuilder<'_> {
        let id = self.tree.child_or_add(self.id, name);
        NodeBuilder {
            tree: &mut *self.tree,
            id,
        }
    }

    pub fn set_child(&mut self, name: &str, state: &NodeState) -> NodeId {
        self.tree.set_child(self.id, name, state)
    }

    pub fn remove_child(&mut self, name: &str) -> bool {
        self.tree.remove_child(self.id, name)
    }

    /// Snapshot of this node's staged subtree
    pub fn state(&self) -> NodeState {
        self.tree.node_state(self.id)
    }
}

impl PropertySource for NodeBuilder<'_> {
    fn property(&self, name: &str) -> Option<&PropertyState> {
        self.tree.property(self.id, name)
    }
}
