//! Validation issue reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single validation issue.
///
/// Issues are flat: nested failures carry their location in `path` (object
/// keys and array indices, outermost first) rather than nesting the issue
/// itself. BadRequest responses serialize the issue list verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Location of the failing value, outermost key first. Empty for the
    /// section root.
    pub path: Vec<String>,
    /// Machine-readable issue code (e.g. "invalid_type", "too_small")
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl Issue {
    /// Create an issue at the section root.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// The issue reported for a value that is absent where one is required.
    pub fn required() -> Self {
        Self::new("invalid_type", "Required")
    }

    /// Prefix the issue path with an enclosing key or index.
    pub fn nested_under(mut self, key: impl Into<String>) -> Self {
        self.path.insert(0, key.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{} at {}: {}", self.code, self.path.join("."), self.message)
        }
    }
}
