//! Constants used throughout the convergent library.
//!
//! This module provides central definitions for the reserved property names and
//! type markers that make up the CRDT naming convention over node properties.
//! Any property matching one of these names or prefixes on a CRDT-tagged node is
//! reserved and must not be used by application code for unrelated purposes.

/// Property listing the type markers carried by a node.
pub const TYPES: &str = "crdt:types";

/// Type marker for the observed-remove-like set.
pub const SET_TYPE: &str = "crdt:set";

/// Type marker for the last-writer-wins register.
pub const LWW_TYPE: &str = "crdt:lww";

/// Type marker for the multi-value register.
pub const MV_TYPE: &str = "crdt:mv";

/// Type marker for the atomic counter.
pub const COUNTER_TYPE: &str = "crdt:counter";

/// Prefix of set addition markers.
pub const ADD_PREFIX: &str = "add-";

/// Prefix of set removal markers.
pub const REMOVE_PREFIX: &str = "remove-";

/// Prefix of register update markers.
pub const UPDATE_PREFIX: &str = "update-";

/// Materialized members of a set.
pub const VALUES: &str = "values";

/// Materialized value of a register.
pub const VALUE: &str = "value";

/// Materialized total of a counter.
pub const COUNTER: &str = "counter";

/// Pending delta applied to a counter at commit time.
pub const INCREMENT: &str = "increment";
