//! Error types for tree operations.
//!
//! These errors cover path resolution against snapshots and staging trees as
//! well as construction of property values.

use thiserror::Error;

use super::value::ScalarType;

/// Structured error types for tree operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TreeError {
    /// No node exists at the given path
    #[error("Node not found: {path}")]
    NodeNotFound { path: String },

    /// The path could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// An array was built from scalars of more than one type
    #[error("Mixed array: expected {expected} elements, found {actual}")]
    MixedArray {
        expected: ScalarType,
        actual: ScalarType,
    },
}

impl TreeError {
    /// Check if this error is related to a missing node
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::NodeNotFound { .. })
    }

    /// Check if this error is related to path parsing
    pub fn is_path_error(&self) -> bool {
        matches!(self, TreeError::InvalidPath { .. })
    }

    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, TreeError::MixedArray { .. })
    }

    /// Get the path if this is a path-related error
    pub fn path(&self) -> Option<&str> {
        match self {
            TreeError::NodeNotFound { path } | TreeError::InvalidPath { path, .. } => Some(path),
            _ => None,
        }
    }
}

// Conversion from TreeError to the main Error type
impl From<TreeError> for crate::Error {
    fn from(err: TreeError) -> Self {
        crate::Error::Tree(err)
    }
}
