//! The versioned property tree.
//!
//! Snapshots ([`NodeState`]) are immutable and structurally compared. A writer
//! stages edits in a [`TreeBuilder`] created from the snapshot it started on;
//! the store turns a builder back into a snapshot on commit.
//!
//! # Core Types
//!
//! - [`NodeState`] - An immutable node with named properties and children
//! - [`TreeBuilder`] - The staging overlay of one writer, addressed by [`NodeId`]
//! - [`NodeBuilder`] - Node-scoped access to a staging tree
//! - [`PropertyState`] / [`PropertyValue`] / [`Scalar`] - Property values
//! - [`NodePath`] - Absolute `/`-separated node paths

pub mod builder;
pub mod errors;
pub mod path;
pub mod state;
pub mod value;

pub use builder::{NodeBuilder, NodeId, TreeBuilder};
pub use errors::TreeError;
pub use path::NodePath;
pub use state::NodeState;
pub use value::{PropertyState, PropertyValue, Scalar, ScalarArray, ScalarType};

/// Anything that exposes named properties.
///
/// Lets read-only helpers such as the type marker lookup work the same way on
/// snapshots and on staged nodes.
pub trait PropertySource {
    fn property(&self, name: &str) -> Option<&PropertyState>;
}
