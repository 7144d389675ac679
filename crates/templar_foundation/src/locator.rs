//! Source locations of stylesheet declarations.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a module or declaration came from.
///
/// Line and column are 1-based; 0 means unknown.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Locator {
    /// System identifier (usually the module URI).
    pub system_id: Arc<str>,
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

impl Locator {
    /// Creates a locator for a whole module.
    #[must_use]
    pub fn module(system_id: &str) -> Self {
        Self {
            system_id: system_id.into(),
            line: 0,
            column: 0,
        }
    }

    /// Creates a locator for a position inside a module.
    #[must_use]
    pub fn at(system_id: &str, line: u32, column: u32) -> Self {
        Self {
            system_id: system_id.into(),
            line,
            column,
        }
    }

    /// Returns a locator for another position in the same module.
    #[must_use]
    pub fn with_position(&self, line: u32, column: u32) -> Self {
        Self {
            system_id: Arc::clone(&self.system_id),
            line,
            column,
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::module("")
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = if self.system_id.is_empty() {
            "<unknown>"
        } else {
            &self.system_id
        };
        if self.line == 0 {
            write!(f, "{id}")
        } else {
            write!(f, "{id}:{}:{}", self.line, self.column)
        }
    }
}
