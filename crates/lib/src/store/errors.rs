//! Error types for the store module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the store itself, as opposed to the hooks it runs.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The state file was written by an incompatible format version.
    #[error("Unsupported state file version {found}; only version {supported} is supported")]
    UnsupportedVersion { found: u8, supported: u8 },

    /// A configuration file could not be used.
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },
}

impl StoreError {
    /// Check if this error comes from the filesystem
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::SerializationFailed { .. } | StoreError::DeserializationFailed { .. }
        )
    }

    /// Check if this error is about the on-disk format version
    pub fn is_version_error(&self) -> bool {
        matches!(self, StoreError::UnsupportedVersion { .. })
    }

    /// Check if this error is a configuration problem
    pub fn is_config_error(&self) -> bool {
        matches!(self, StoreError::InvalidConfig { .. })
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
