//! Convergent register types layered on the tree.
//!
//! A node opts into a register behaviour by listing a type marker in its
//! `crdt:types` property. Writers never overwrite the materialized state of
//! such a node directly (except for the multi-value register); they stage
//! uniquely named operation markers that the commit pipeline folds into the
//! materialized property and deletes in the same step.
//!
//! | Kind | Marker | Operations | Materialized |
//! |------|--------|------------|--------------|
//! | [`RegisterKind::Set`] | `crdt:set` | `add-*`, `remove-*` | `values` |
//! | [`RegisterKind::Lww`] | `crdt:lww` | `update-*` | `value` |
//! | [`RegisterKind::Mv`] | `crdt:mv` | writes of `value` | `value` |
//! | [`RegisterKind::Counter`] | `crdt:counter` | `increment` | `counter` |
//!
//! The set, LWW and counter kinds are applied by [`RegisterEditor`] at commit
//! time. The multi-value register only acts during rebase, through
//! [`MvConflictHandler`].

pub mod counter;
pub mod editor;
pub mod errors;
pub mod lww;
pub mod mv;
pub mod set;
mod values;

use std::{fmt, str::FromStr};

pub use counter::CounterEditor;
pub use editor::{RegisterEditor, RegisterEditorProvider};
pub use errors::CRDTError;
pub use lww::LwwEditor;
pub use mv::MvConflictHandler;
use serde::{Deserialize, Serialize};
pub use set::SetEditor;

use crate::{
    constants::{COUNTER, COUNTER_TYPE, LWW_TYPE, MV_TYPE, SET_TYPE, TYPES, VALUE, VALUES},
    tree::{PropertySource, PropertyState, Scalar},
};

/// The register kinds a node can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    Set,
    Lww,
    Mv,
    Counter,
}

impl RegisterKind {
    pub const ALL: [RegisterKind; 4] = [
        RegisterKind::Set,
        RegisterKind::Lww,
        RegisterKind::Mv,
        RegisterKind::Counter,
    ];

    /// The type marker naming this kind in `crdt:types`
    pub fn marker(&self) -> &'static str {
        match self {
            RegisterKind::Set => SET_TYPE,
            RegisterKind::Lww => LWW_TYPE,
            RegisterKind::Mv => MV_TYPE,
            RegisterKind::Counter => COUNTER_TYPE,
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == marker)
    }

    /// The property holding the converged state
    pub fn materialized(&self) -> &'static str {
        match self {
            RegisterKind::Set => VALUES,
            RegisterKind::Lww | RegisterKind::Mv => VALUE,
            RegisterKind::Counter => COUNTER,
        }
    }

    /// Every kind whose marker `node` carries, in declaration order.
    pub fn of<P: PropertySource + ?Sized>(node: &P) -> Vec<RegisterKind> {
        node.property(TYPES)
            .map(Self::listed_in)
            .unwrap_or_default()
    }

    /// Every kind named by a `crdt:types` property, in declaration order.
    pub fn listed_in(types: &PropertyState) -> Vec<RegisterKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| lists(types, kind.marker()))
            .collect()
    }

    fn name(&self) -> &'static str {
        match self {
            RegisterKind::Set => "set",
            RegisterKind::Lww => "lww",
            RegisterKind::Mv => "mv",
            RegisterKind::Counter => "counter",
        }
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegisterKind {
    type Err = CRDTError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.marker() == s)
            .ok_or_else(|| CRDTError::UnknownKind {
                name: s.to_string(),
            })
    }
}

/// Whether `node` lists `marker` in its `crdt:types` property.
pub fn has_type<P: PropertySource + ?Sized>(node: &P, marker: &str) -> bool {
    node.property(TYPES)
        .is_some_and(|types| lists(types, marker))
}

fn lists(types: &PropertyState, marker: &str) -> bool {
    types
        .value()
        .values()
        .iter()
        .any(|t| t.as_str() == Some(marker))
}

/// The `crdt:types` property of a node after adding `marker` to `existing`.
pub fn with_type(existing: Option<&PropertyState>, marker: &str) -> PropertyState {
    let mut markers: Vec<&str> = existing
        .map(|types| types.value().values().iter().filter_map(Scalar::as_str).collect())
        .unwrap_or_default();
    if !markers.contains(&marker) {
        markers.push(marker);
    }
    PropertyState::new(TYPES, markers)
}

fn enabled_default() -> bool {
    true
}

/// Which register kinds the store applies.
///
/// A disabled kind is ignored entirely: its markers stay ordinary properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdtConfig {
    #[serde(default = "enabled_default")]
    pub set: bool,
    #[serde(default = "enabled_default")]
    pub lww: bool,
    #[serde(default = "enabled_default")]
    pub mv: bool,
    #[serde(default = "enabled_default")]
    pub counter: bool,
}

impl CrdtConfig {
    /// Every kind disabled
    pub fn none() -> Self {
        Self {
            set: false,
            lww: false,
            mv: false,
            counter: false,
        }
    }

    pub fn is_enabled(&self, kind: RegisterKind) -> bool {
        match kind {
            RegisterKind::Set => self.set,
            RegisterKind::Lww => self.lww,
            RegisterKind::Mv => self.mv,
            RegisterKind::Counter => self.counter,
        }
    }

    /// Whether any commit-time editor is enabled
    pub fn has_editors(&self) -> bool {
        self.set || self.lww || self.counter
    }
}

impl Default for CrdtConfig {
    fn default() -> Self {
        Self {
            set: true,
            lww: true,
            mv: true,
            counter: true,
        }
    }
}
