//! Error types for rebasing staged changes.

use thiserror::Error;

use super::Conflict;

/// Errors that can occur while rebasing a writer's changes onto a newer head.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MergeError {
    /// At least one collision was declined by every handler under the `fail` policy
    #[error(
        "{} unresolved conflict(s), first: {}",
        .conflicts.len(),
        .conflicts.first().map(ToString::to_string).unwrap_or_default()
    )]
    UnresolvedConflicts { conflicts: Vec<Conflict> },
}

impl MergeError {
    /// Check if this error reports conflicts nobody resolved
    pub fn is_unresolved_conflict(&self) -> bool {
        matches!(self, MergeError::UnresolvedConflicts { .. })
    }

    /// The unresolved conflicts, if any
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            MergeError::UnresolvedConflicts { conflicts } => conflicts,
        }
    }
}

// Conversion from MergeError to the main Error type
impl From<MergeError> for crate::Error {
    fn from(err: MergeError) -> Self {
        crate::Error::Merge(err)
    }
}
