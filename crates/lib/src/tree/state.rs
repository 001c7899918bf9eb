//! Immutable tree snapshots.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{PropertySource, path::NodePath, value::PropertyState};

/// An immutable snapshot of a node and its subtree.
///
/// Properties and children are kept in name order, which is also the order in
/// which the diff walker reports them. Children are shared between snapshots,
/// so cloning a `NodeState` is cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        with = "property_map"
    )]
    properties: BTreeMap<String, PropertyState>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, Arc<NodeState>>,
}

impl NodeState {
    /// A node with no properties and no children
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        properties: BTreeMap<String, PropertyState>,
        children: BTreeMap<String, Arc<NodeState>>,
    ) -> Self {
        Self {
            properties,
            children,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyState> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyState> {
        self.properties.values()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn child(&self, name: &str) -> Option<&NodeState> {
        self.children.get(name).map(Arc::as_ref)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &NodeState)> {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child.as_ref()))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The node at `path` below this one
    pub fn node_at(&self, path: &NodePath) -> Option<&NodeState> {
        path.components()
            .try_fold(self, |node, name| node.child(name))
    }

    /// Returns a copy of this node with `property` set.
    pub fn with_property(mut self, property: PropertyState) -> Self {
        self.properties.insert(property.name().to_string(), property);
        self
    }

    /// Returns a copy of this node with the child `name` replaced by `child`.
    pub fn with_child(mut self, name: impl Into<String>, child: NodeState) -> Self {
        self.children.insert(name.into(), Arc::new(child));
        self
    }

    pub(crate) fn property_map(&self) -> &BTreeMap<String, PropertyState> {
        &self.properties
    }

    pub(crate) fn child_map(&self) -> &BTreeMap<String, Arc<NodeState>> {
        &self.children
    }
}

impl PropertySource for NodeState {
    fn property(&self, name: &str) -> Option<&PropertyState> {
        self.properties.get(name)
    }
}

/// Serializes properties as a plain `name -> value` map.
mod property_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::tree::value::{PropertyState, PropertyValue};

    pub fn serialize<S>(
        properties: &BTreeMap<String, PropertyState>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(properties.iter().map(|(name, p)| (name, p.value())))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, PropertyState>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, PropertyValue>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(name, value)| (name.clone(), PropertyState::new(name, value)))
            .collect())
    }
}
