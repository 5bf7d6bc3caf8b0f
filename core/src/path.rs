//! Logical path validation and translation.
//!
//! A logical path addresses a resource inside the virtual filesystem:
//! `/`-separated, case-sensitive, with no notion of the host's path syntax.
//! Validation happens once at the public surface; backends only ever see
//! normalized paths.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};

/// A validated, normalized logical path.
///
/// Invariants: no leading or trailing `/`, no empty components, no `.` or
/// `..` components, no NUL bytes. The empty string names the root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogicalPath {
    joined: String,
}

impl LogicalPath {
    /// Validate and normalize a caller-supplied path.
    ///
    /// A leading `/` is ignored, a single trailing `/` is tolerated. Any
    /// other empty component, any `.` or `..` component, and any component
    /// containing a NUL byte is rejected with `InvalidPath` before any
    /// filesystem access.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim_start_matches('/');
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Ok(Self {
                joined: String::new(),
            });
        }

        for component in trimmed.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(Error::new(ErrorKind::InvalidPath, "path.parse"));
            }
            if component.as_bytes().contains(&0) {
                return Err(Error::new(ErrorKind::InvalidPath, "path.parse"));
            }
        }

        Ok(Self {
            joined: trimmed.to_owned(),
        })
    }

    /// The root of the virtual filesystem (the empty path).
    pub fn root() -> Self {
        Self {
            joined: String::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.joined.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.joined
    }

    /// Path components, in order. Empty for the root.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.joined.split('/').filter(|c| !c.is_empty())
    }

    /// The final component, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.components().last()
    }

    /// Translate into a native path under `base`, substituting the platform
    /// separator componentwise.
    pub fn to_native(&self, base: &Path) -> PathBuf {
        let mut out = base.to_path_buf();
        for component in self.components() {
            out.push(component);
        }
        out
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}
