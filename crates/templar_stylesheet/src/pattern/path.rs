//! Built-in matcher for XSLT 1.0 location-path patterns.
//!
//! Supported: `/`, `a/b`, `a//b`, `/a`, `//a`, `@x`, `@*`, `*`, `{uri}x`,
//! `{uri}*`, `node()`, `text()`, `comment()`, `processing-instruction()`
//! (optionally with a literal target), and attribute predicates `[@x]` and
//! `[@x='v']`. Names with a prefix must already be expanded to `{uri}local`.

use std::fmt;
use std::sync::Arc;

use templar_foundation::{Error, Priority, QName, Result, Score};

use super::{Matcher, TargetKey};
use crate::node::{NodeKind, NodeRef};

// =============================================================================
// Pattern AST
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Child,
    Attribute,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NodeTest {
    Name(QName),
    Any,
    NamespaceAny(Arc<str>),
    Node,
    Text,
    Comment,
    ProcessingInstruction(Option<Arc<str>>),
}

/// How a step relates to the step before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Separator {
    Child,
    Descendant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Anchor {
    Relative,
    Root,
    Descendant,
}

#[derive(Clone, Debug)]
struct Predicate {
    attribute: QName,
    value: Option<String>,
}

impl Predicate {
    fn holds(&self, node: NodeRef<'_>) -> bool {
        let Some(attr) = node.attribute(self.attribute.namespace(), self.attribute.local_name())
        else {
            return false;
        };
        self.value
            .as_deref()
            .is_none_or(|expected| attr.content() == Some(expected))
    }
}

#[derive(Clone, Debug)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
    separator: Separator,
}

impl Step {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        let kind = node.kind();
        let kind_ok = match self.axis {
            Axis::Attribute => kind == NodeKind::Attribute,
            Axis::Child => match &self.test {
                NodeTest::Name(_) | NodeTest::Any | NodeTest::NamespaceAny(_) => {
                    kind == NodeKind::Element
                }
                NodeTest::Node => kind.is_child_kind(),
                NodeTest::Text => kind.is_text(),
                NodeTest::Comment => kind == NodeKind::Comment,
                NodeTest::ProcessingInstruction(target) => {
                    kind == NodeKind::ProcessingInstruction
                        && target
                            .as_deref()
                            .is_none_or(|t| node.local_name() == Some(t))
                }
            },
        };

        kind_ok && self.name_ok(node) && self.predicates.iter().all(|p| p.holds(node))
    }

    fn name_ok(&self, node: NodeRef<'_>) -> bool {
        match &self.test {
            NodeTest::Name(name) => node
                .local_name()
                .is_some_and(|local| name.matches(node.namespace_uri(), local)),
            NodeTest::NamespaceAny(uri) => node.namespace_uri() == Some(&**uri),
            _ => true,
        }
    }
}

// =============================================================================
// PathPattern
// =============================================================================

/// A compiled location-path pattern.
#[derive(Clone)]
pub struct PathPattern {
    source: Arc<str>,
    anchor: Anchor,
    steps: Vec<Step>,
    priority: Priority,
    target: TargetKey,
}

impl PathPattern {
    /// Parses a single alternative (no top-level `|`).
    ///
    /// # Errors
    /// Returns a `PatternSyntax` error for malformed or unsupported syntax.
    pub fn parse(text: &str) -> Result<Self> {
        Parser::new(text, text, 0).path()
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns true if `node` matches.
    #[must_use]
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        match self.steps.len() {
            0 => node.kind() == NodeKind::Document,
            n => self.match_at(n - 1, node),
        }
    }

    fn match_at(&self, index: usize, node: NodeRef<'_>) -> bool {
        let step = &self.steps[index];
        if !step.matches(node) {
            return false;
        }

        if index == 0 {
            return match self.anchor {
                Anchor::Relative => true,
                Anchor::Root => node.parent().is_some_and(|p| p.kind() == NodeKind::Document),
                Anchor::Descendant => node
                    .ancestors()
                    .last()
                    .is_some_and(|r| r.kind() == NodeKind::Document),
            };
        }

        match step.separator {
            Separator::Child => node.parent().is_some_and(|p| self.match_at(index - 1, p)),
            Separator::Descendant => node.ancestors().any(|a| self.match_at(index - 1, a)),
        }
    }

    fn new(source: &str, anchor: Anchor, steps: Vec<Step>) -> Self {
        let priority = default_priority(anchor, &steps);
        let target = steps.last().map_or(TargetKey::Document, |step| match &step.test {
            NodeTest::Name(name) => TargetKey::Name(name.local_name().into()),
            NodeTest::Text => TargetKey::Text,
            NodeTest::Comment => TargetKey::Comment,
            NodeTest::ProcessingInstruction(_) => TargetKey::ProcessingInstruction,
            NodeTest::Any | NodeTest::NamespaceAny(_) | NodeTest::Node => TargetKey::Wildcard,
        });
        Self {
            source: source.trim().into(),
            anchor,
            steps,
            priority,
            target,
        }
    }
}

fn default_priority(anchor: Anchor, steps: &[Step]) -> Priority {
    match (anchor, steps) {
        (Anchor::Relative, [step]) if step.predicates.is_empty() => match step.test {
            NodeTest::Name(_) | NodeTest::ProcessingInstruction(Some(_)) => Priority::NAME_TEST,
            NodeTest::NamespaceAny(_) => Priority::NAMESPACE_WILDCARD,
            _ => Priority::KIND_TEST,
        },
        _ => Priority::COMPLEX,
    }
}

impl Matcher for PathPattern {
    fn match_score(&self, node: NodeRef<'_>) -> Score {
        if self.matches(node) {
            Score::Match(self.priority)
        } else {
            Score::NoMatch
        }
    }

    fn target_hint(&self) -> TargetKey {
        self.target.clone()
    }

    fn default_priority(&self) -> Priority {
        self.priority
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathPattern({:?})", self.source)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Splits `text` on top-level `|` and parses each alternative.
pub(crate) fn parse_union(text: &str) -> Result<Vec<PathPattern>> {
    let mut alternatives = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[' | '{' | '(') => depth += 1,
            (None, ']' | '}' | ')') => depth = depth.saturating_sub(1),
            (None, '|') if depth == 0 => {
                alternatives.push(Parser::new(text, &text[start..i], start).path()?);
                start = i + 1;
            }
            _ => {}
        }
    }
    alternatives.push(Parser::new(text, &text[start..], start).path()?);
    Ok(alternatives)
}

struct Parser<'src> {
    /// Whole pattern, for error messages.
    full: &'src str,
    /// The alternative being parsed.
    text: &'src str,
    /// Offset of `text` within `full`.
    base: usize,
    /// Byte offset within `text`.
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(full: &'src str, text: &'src str, base: usize) -> Self {
        Self {
            full,
            text,
            base,
            pos: 0,
        }
    }

    fn path(mut self) -> Result<PathPattern> {
        self.skip_ws();
        if self.at_end() {
            return Err(self.error("empty pattern"));
        }

        let anchor = if self.eat("//") {
            Anchor::Descendant
        } else if self.eat("/") {
            Anchor::Root
        } else {
            Anchor::Relative
        };

        self.skip_ws();
        let mut steps = Vec::new();
        if anchor == Anchor::Root && self.at_end() {
            return Ok(PathPattern::new(self.text, anchor, steps));
        }

        let mut separator = Separator::Child;
        loop {
            steps.push(self.step(separator)?);
            self.skip_ws();
            if self.at_end() {
                break;
            }
            separator = if self.eat("//") {
                Separator::Descendant
            } else if self.eat("/") {
                Separator::Child
            } else {
                return Err(self.error("expected '/' or end of pattern"));
            };
            self.skip_ws();
        }

        Ok(PathPattern::new(self.text, anchor, steps))
    }

    fn step(&mut self, separator: Separator) -> Result<Step> {
        let axis = if self.eat("@") || self.eat("attribute::") {
            Axis::Attribute
        } else {
            self.eat("child::");
            Axis::Child
        };

        self.skip_ws();
        let start = self.pos;
        let test = self.node_test()?;
        if axis == Axis::Attribute
            && matches!(
                test,
                NodeTest::Text | NodeTest::Comment | NodeTest::ProcessingInstruction(_)
            )
        {
            return Err(self.error_at(start, "the attribute axis only admits name tests and node()"));
        }

        let mut predicates = Vec::new();
        loop {
            self.skip_ws();
            if !self.eat("[") {
                break;
            }
            predicates.push(self.predicate()?);
        }

        Ok(Step {
            axis,
            test,
            predicates,
            separator,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest> {
        if self.eat("*") {
            return Ok(NodeTest::Any);
        }

        if self.peek() == Some('{') || self.rest().starts_with("Q{") {
            let uri = self.braced_uri()?;
            if self.eat("*") {
                return Ok(NodeTest::NamespaceAny(uri.into()));
            }
            let local = self.ncname()?;
            return Ok(NodeTest::Name(QName::new(uri, local)));
        }

        let start = self.pos;
        let name = self.ncname()?;
        self.skip_ws();

        if self.eat("(") {
            self.skip_ws();
            let test = match name {
                "node" => NodeTest::Node,
                "text" => NodeTest::Text,
                "comment" => NodeTest::Comment,
                "processing-instruction" => {
                    let target = match self.peek() {
                        Some('\'' | '"') => Some(self.literal()?.into()),
                        _ => None,
                    };
                    NodeTest::ProcessingInstruction(target)
                }
                other => {
                    return Err(self.error_at(start, format!("unknown node test {other}()")));
                }
            };
            self.skip_ws();
            if !self.eat(")") {
                return Err(self.error("expected ')'"));
            }
            return Ok(test);
        }

        if self.peek() == Some(':') {
            return Err(self.error_at(start, "prefixed names must be written as {uri}local"));
        }
        Ok(NodeTest::Name(QName::local(name)))
    }

    fn predicate(&mut self) -> Result<Predicate> {
        self.skip_ws();
        if !self.eat("@") {
            return Err(self.error("only attribute predicates are supported"));
        }

        let attribute = if self.peek() == Some('{') || self.rest().starts_with("Q{") {
            let uri = self.braced_uri()?;
            QName::new(uri, self.ncname()?)
        } else {
            QName::local(self.ncname()?)
        };

        self.skip_ws();
        let value = if self.eat("=") {
            self.skip_ws();
            Some(self.literal()?.to_string())
        } else {
            None
        };

        self.skip_ws();
        if !self.eat("]") {
            return Err(self.error("expected ']'"));
        }
        Ok(Predicate { attribute, value })
    }

    fn braced_uri(&mut self) -> Result<&'src str> {
        self.eat("Q");
        let open = self.pos;
        self.eat("{");
        let rest = self.rest();
        let Some(close) = rest.find('}') else {
            return Err(self.error_at(open, "unterminated '{'"));
        };
        let uri = &rest[..close];
        self.pos += close + 1;
        Ok(uri)
    }

    fn ncname(&mut self) -> Result<&'src str> {
        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            let ok = if i == 0 {
                c.is_alphabetic() || c == '_'
            } else {
                c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
            };
            if !ok {
                break;
            }
            end = i + c.len_utf8();
        }
        if end == 0 {
            return Err(self.error("expected a name"));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn literal(&mut self) -> Result<&'src str> {
        let start = self.pos;
        let Some(quote) = self.peek().filter(|c| matches!(*c, '\'' | '"')) else {
            return Err(self.error("expected a quoted literal"));
        };
        self.pos += 1;
        let rest = self.rest();
        let Some(close) = rest.find(quote) else {
            return Err(self.error_at(start, "unterminated literal"));
        };
        self.pos += close + 1;
        Ok(&rest[..close])
    }

    fn rest(&self) -> &'src str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: impl Into<String>) -> Error {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> Error {
        Error::pattern_syntax(self.full, self.base + pos, message)
    }
}

// =============================================================================
// Tests
// =============================================================================
