//! Match patterns and the matcher seam.
//!
//! A template's `match` attribute is a [`MatchPattern`]: either a single
//! [`StepPattern`] or a union of them. Each step wraps a [`Matcher`], the
//! interface to whatever pattern engine produced it. [`PathPattern`] is the
//! built-in engine for the XSLT 1.0 pattern subset.

pub mod path;

pub use path::PathPattern;

use std::fmt;
use std::sync::Arc;

use templar_foundation::{Error, Priority, Result, Score};

use crate::node::{NodeKind, NodeRef};

// =============================================================================
// TargetKey
// =============================================================================

/// The dispatch bucket a pattern (or node) belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// Element or attribute local name.
    Name(Arc<str>),
    /// Text and CDATA nodes.
    Text,
    /// Comment nodes.
    Comment,
    /// Processing-instruction nodes.
    ProcessingInstruction,
    /// The document node.
    Document,
    /// Could match nodes of any name (`*`, `@*`, `node()`).
    Wildcard,
}

impl TargetKey {
    /// Classifies a node into the bucket its rules live in.
    ///
    /// Namespace nodes, and named nodes without a local name, have no
    /// dedicated bucket and classify as [`TargetKey::Wildcard`].
    #[must_use]
    pub fn for_node(node: NodeRef<'_>) -> Self {
        match node.kind() {
            NodeKind::Element | NodeKind::Attribute => node
                .local_name()
                .map_or(Self::Wildcard, |name| Self::Name(name.into())),
            NodeKind::Text | NodeKind::CData => Self::Text,
            NodeKind::Comment => Self::Comment,
            NodeKind::ProcessingInstruction => Self::ProcessingInstruction,
            NodeKind::Document => Self::Document,
            NodeKind::Namespace => Self::Wildcard,
        }
    }

    /// Returns true for the wildcard marker.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Text => f.write_str("#text"),
            Self::Comment => f.write_str("#comment"),
            Self::ProcessingInstruction => f.write_str("#pi"),
            Self::Document => f.write_str("/"),
            Self::Wildcard => f.write_str("*"),
        }
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// A compiled single-alternative pattern.
///
/// Implementations must be pure: the same node always gets the same score.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Scores `node`; [`Score::Match`] carries the pattern's default priority.
    fn match_score(&self, node: NodeRef<'_>) -> Score;

    /// The dispatch bucket this pattern's matches fall into.
    fn target_hint(&self) -> TargetKey;

    /// Priority used when the template declares none.
    fn default_priority(&self) -> Priority;
}

// =============================================================================
// StepPattern
// =============================================================================

/// One alternative of a match pattern.
///
/// Cloning shares the underlying matcher.
#[derive(Clone)]
pub struct StepPattern {
    matcher: Arc<dyn Matcher>,
}

impl StepPattern {
    /// Wraps a matcher.
    pub fn new(matcher: impl Matcher + 'static) -> Self {
        Self {
            matcher: Arc::new(matcher),
        }
    }

    /// Wraps an already shared matcher.
    #[must_use]
    pub fn from_shared(matcher: Arc<dyn Matcher>) -> Self {
        Self { matcher }
    }

    /// Scores `node` against this alternative.
    #[must_use]
    pub fn match_score(&self, node: NodeRef<'_>) -> Score {
        self.matcher.match_score(node)
    }

    /// Returns true if `node` matches.
    #[must_use]
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.match_score(node).is_match()
    }

    /// The dispatch bucket of this alternative.
    #[must_use]
    pub fn target_hint(&self) -> TargetKey {
        self.matcher.target_hint()
    }

    /// The default priority of this alternative.
    #[must_use]
    pub fn default_priority(&self) -> Priority {
        self.matcher.default_priority()
    }
}

impl fmt::Debug for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.matcher, f)
    }
}

// =============================================================================
// MatchPattern
// =============================================================================

/// A template's match pattern.
#[derive(Clone, Debug)]
pub enum MatchPattern {
    /// A single alternative.
    Step(StepPattern),
    /// `a | b | ...`; each alternative is dispatched independently.
    Union(Vec<StepPattern>),
}

impl MatchPattern {
    /// Parses pattern text with the built-in [`PathPattern`] engine.
    ///
    /// # Errors
    /// Returns a `PatternSyntax` error if any alternative is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        let mut alternatives = path::parse_union(text)?;
        if alternatives.len() > 1 {
            return Ok(Self::Union(
                alternatives.into_iter().map(StepPattern::new).collect(),
            ));
        }
        alternatives
            .pop()
            .map(|only| Self::Step(StepPattern::new(only)))
            .ok_or_else(|| Error::pattern_syntax(text, 0, "empty pattern"))
    }

    /// Wraps a single matcher.
    pub fn step(matcher: impl Matcher + 'static) -> Self {
        Self::Step(StepPattern::new(matcher))
    }

    /// Returns the alternatives in source order.
    ///
    /// # Panics
    /// Panics on an empty union. Upstream compilers never produce one, so an
    /// empty union means a broken pattern compiler rather than bad input.
    #[must_use]
    pub fn alternatives(&self) -> &[StepPattern] {
        match self {
            Self::Step(step) => std::slice::from_ref(step),
            Self::Union(steps) => {
                assert!(
                    !steps.is_empty(),
                    "match pattern is neither a single step nor a union of steps"
                );
                steps
            }
        }
    }

    /// Returns true if any alternative matches `node`.
    #[must_use]
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.alternatives().iter().any(|alt| alt.matches(node))
    }
}
