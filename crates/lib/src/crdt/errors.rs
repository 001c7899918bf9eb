//! Error types for CRDT operations.
//!
//! The register editors have one expected failure: an operation whose value
//! has a different primitive type than the state it is folded into. It fails
//! the enclosing commit instead of coercing or truncating anything.

use thiserror::Error;

use crate::tree::PropertyValue;

/// Structured error types for CRDT operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CRDTError {
    /// An operation's value does not match the type of the materialized state
    #[error("CRDT type mismatch on '{property}': expected {expected}, found {actual}")]
    TypeMismatch {
        property: String,
        expected: String,
        actual: String,
    },

    /// A counter would leave the range of a Long
    #[error("CRDT counter overflow on '{property}'")]
    Overflow { property: String },

    /// The name is not one of the known register kinds
    #[error("Unknown register kind: {name}")]
    UnknownKind { name: String },
}

impl CRDTError {
    /// Mismatch between the value of `property` and an expected type label.
    pub(crate) fn mismatch(property: &str, expected: impl Into<String>, actual: &PropertyValue) -> Self {
        CRDTError::TypeMismatch {
            property: property.to_string(),
            expected: expected.into(),
            actual: type_label(actual),
        }
    }

    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, CRDTError::TypeMismatch { .. })
    }

    /// Check if this error is an arithmetic overflow
    pub fn is_overflow(&self) -> bool {
        matches!(self, CRDTError::Overflow { .. })
    }

    /// Get the property name if this error concerns one property
    pub fn property(&self) -> Option<&str> {
        match self {
            CRDTError::TypeMismatch { property, .. } | CRDTError::Overflow { property } => {
                Some(property)
            }
            _ => None,
        }
    }
}

/// `Long` for a single long, `Long[]` for an array of longs.
pub(crate) fn type_label(value: &PropertyValue) -> String {
    if value.is_array() {
        format!("{}[]", value.scalar_type())
    } else {
        value.scalar_type().to_string()
    }
}

// Conversion from CRDTError to the main Error type
impl From<CRDTError> for crate::Error {
    fn from(err: CRDTError) -> Self {
        crate::Error::CRDT(err)
    }
}
