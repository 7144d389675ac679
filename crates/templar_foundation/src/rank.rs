//! Ranking keys for template dispatch.
//!
//! Rules are ordered by [`Precedence`] first (import precedence of their
//! module), then [`Priority`] (explicit or pattern default), then by document
//! position. A matcher reports how well a node matched with a [`Score`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Precedence
// =============================================================================

/// Import precedence of a module. Higher values outrank lower ones.
///
/// Every module in a global import list has a distinct precedence; included
/// modules share the precedence of their includer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Precedence(u32);

impl Precedence {
    /// The lowest possible precedence.
    pub const LOWEST: Precedence = Precedence(0);

    /// Creates a precedence from a raw rank.
    #[must_use]
    pub const fn new(rank: u32) -> Self {
        Self(rank)
    }

    /// Returns the raw rank.
    #[must_use]
    pub const fn rank(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precedence {}", self.0)
    }
}

// =============================================================================
// Priority
// =============================================================================

/// A template priority: a finite real number with a total order.
///
/// Deserialization goes through [`Priority::new`], so a decoded priority is
/// always finite and never `-0.0`.
#[derive(Copy, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "f64", into = "f64")
)]
pub struct Priority(f64);

/// A priority value that is NaN or infinite.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[error("priority must be a finite number, got {0}")]
pub struct InvalidPriority(pub f64);

impl Priority {
    /// Default priority of a bare name test (`item`, `@id`) or a
    /// processing-instruction test with a literal target.
    pub const NAME_TEST: Priority = Priority(0.0);

    /// Default priority of a namespace wildcard (`{uri}*`).
    pub const NAMESPACE_WILDCARD: Priority = Priority(-0.25);

    /// Default priority of `*`, `@*`, and node-type tests (`text()`, `node()`).
    pub const KIND_TEST: Priority = Priority(-0.5);

    /// Default priority of every other pattern (multiple steps, predicates, `/`).
    pub const COMPLEX: Priority = Priority(0.5);

    /// Creates a priority. Returns `None` for NaN or infinite values.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() {
            // -0.0 and 0.0 are the same priority
            Some(Self(value + 0.0))
        } else {
            None
        }
    }

    /// Parses a priority attribute value such as `"2"` or `"-0.5"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<f64>().ok().and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidPriority(value))
    }
}

impl From<Priority> for f64 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Priority {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NAME_TEST
    }
}

impl fmt::Debug for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Score
// =============================================================================

/// Result of matching a pattern against a node.
///
/// `NoMatch` sorts below every `Match`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Score {
    /// The pattern does not match the node.
    NoMatch,
    /// The pattern matches; carries the pattern's default priority.
    Match(Priority),
}

impl Score {
    /// Returns true for any match.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match(_))
    }

    /// Returns the priority of a match.
    #[must_use]
    pub const fn priority(self) -> Option<Priority> {
        match self {
            Self::NoMatch => None,
            Self::Match(p) => Some(p),
        }
    }
}
