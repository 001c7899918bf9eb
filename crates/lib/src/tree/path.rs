//! Absolute node paths.
//!
//! Nodes are addressed by `/`-separated paths from the root, e.g. `/a/b`.
//! Paths are normalized on construction: repeated and trailing separators are
//! dropped, so `//a/b/` and `/a/b` name the same node and `/` is the root.
//!
//! ```rust
//! use convergent::tree::NodePath;
//!
//! let path: NodePath = "//set/members/".parse()?;
//! assert_eq!(path.as_str(), "/set/members");
//! assert_eq!(path.name(), Some("members"));
//! assert_eq!(path.parent().unwrap().as_str(), "/set");
//! # Ok::<(), convergent::tree::TreeError>(())
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::errors::TreeError;

/// Normalizes a path string by collapsing empty components.
///
/// ```rust
/// # use convergent::tree::path::normalize_path;
/// assert_eq!(normalize_path("/"), "/");
/// assert_eq!(normalize_path("//a///b/"), "/a/b");
/// ```
pub fn normalize_path(input: &str) -> String {
    let components: Vec<&str> = input.split('/').filter(|c| !c.is_empty()).collect();
    format!("/{}", components.join("/"))
}

/// An owned, normalized, absolute node path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    inner: String,
}

impl NodePath {
    /// The root path `/`
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Names of the nodes from the root down, excluding the root itself
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|c| !c.is_empty())
    }

    /// Number of components below the root
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    /// Name of the last component, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.components().last()
    }

    /// The parent path, `None` for the root
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        let cut = self.inner.rfind('/').unwrap_or(0);
        Some(Self {
            inner: normalize_path(&self.inner[..cut]),
        })
    }

    /// Append a child name.
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidPath`] if `name` is empty or contains `/`.
    pub fn child(&self, name: &str) -> Result<NodePath, TreeError> {
        if name.is_empty() || name.contains('/') {
            return Err(TreeError::InvalidPath {
                path: format!("{}/{name}", self.inner),
                reason: "child names must be non-empty and cannot contain '/'".to_string(),
            });
        }
        Ok(Self {
            inner: normalize_path(&format!("{}/{name}", self.inner)),
        })
    }
}

impl FromStr for NodePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with('/') {
            return Err(TreeError::InvalidPath {
                path: s.to_string(),
                reason: "paths must be absolute".to_string(),
            });
        }
        Ok(Self {
            inner: normalize_path(s),
        })
    }
}

impl TryFrom<String> for NodePath {
    type Error = TreeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&str> for NodePath {
    type Error = TreeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.inner
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
