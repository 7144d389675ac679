//! Template dispatch.
//!
//! Dispatch walks the one chain the pattern index selects for a node and
//! returns the first association whose pattern matches and whose rule is in
//! the requested mode. Chains are ordered by import precedence before
//! priority, so a miss at one precedence level falls through to the modules
//! it imports without a second lookup. When nothing matches, one of the
//! built-in rules applies; dispatch never fails.

use std::fmt;

use templar_foundation::QName;
use templar_stylesheet::{NodeKind, NodeRef};
use tracing::{trace, warn};

use crate::composed::ComposedView;
use crate::index::Association;
use crate::rule::CompiledRule;

// =============================================================================
// BuiltInRule
// =============================================================================

/// The built-in template rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltInRule {
    /// `match="*"`: apply templates to the children in the same mode.
    ProcessChildren,
    /// `match="text()|@*"`: copy the string value.
    CopyStringValue,
    /// `match="/"`: apply templates to the children in the same mode.
    ProcessRoot,
    /// `match="comment()|processing-instruction()"`: produce nothing.
    Ignore,
}

impl BuiltInRule {
    /// Selects the built-in rule for a node kind.
    #[must_use]
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Document => Self::ProcessRoot,
            NodeKind::Element => Self::ProcessChildren,
            NodeKind::Attribute | NodeKind::Text | NodeKind::CData => Self::CopyStringValue,
            NodeKind::Comment | NodeKind::ProcessingInstruction | NodeKind::Namespace => {
                Self::Ignore
            }
        }
    }

    /// The match pattern the rule is written with.
    #[must_use]
    pub fn pattern(self) -> &'static str {
        match self {
            Self::ProcessChildren => "*",
            Self::CopyStringValue => "text()|@*",
            Self::ProcessRoot => "/",
            Self::Ignore => "comment()|processing-instruction()",
        }
    }

    /// Returns true if the rule recurses into children.
    #[must_use]
    pub fn processes_children(self) -> bool {
        matches!(self, Self::ProcessChildren | Self::ProcessRoot)
    }
}

impl fmt::Display for BuiltInRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "built-in rule for {}", self.pattern())
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// The rule governing a node.
#[derive(Copy, Clone, Debug)]
pub enum Resolution<'a> {
    /// A stylesheet rule.
    Rule(&'a CompiledRule),
    /// No stylesheet rule matched.
    BuiltIn(BuiltInRule),
}

impl<'a> Resolution<'a> {
    /// The stylesheet rule, if one matched.
    #[must_use]
    pub fn rule(self) -> Option<&'a CompiledRule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::BuiltIn(_) => None,
        }
    }

    /// The built-in rule, if no stylesheet rule matched.
    #[must_use]
    pub fn built_in(self) -> Option<BuiltInRule> {
        match self {
            Self::Rule(_) => None,
            Self::BuiltIn(built_in) => Some(built_in),
        }
    }

    /// Returns true if a built-in rule applies.
    #[must_use]
    pub fn is_built_in(self) -> bool {
        matches!(self, Self::BuiltIn(_))
    }
}

impl PartialEq for Resolution<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rule(a), Self::Rule(b)) => a.id() == b.id(),
            (Self::BuiltIn(a), Self::BuiltIn(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Resolution<'_> {}

// =============================================================================
// Dispatch
// =============================================================================

impl ComposedView {
    /// Finds the stylesheet rule governing `node` in `mode`, without the
    /// built-in fallback.
    #[must_use]
    pub fn find_rule(&self, node: NodeRef<'_>, mode: Option<&QName>) -> Option<&CompiledRule> {
        self.search(node, mode, |_| true)
    }

    /// Resolves the rule governing `node` in `mode`. Never fails: when no
    /// stylesheet rule matches, a built-in rule is returned.
    #[must_use]
    pub fn resolve(&self, node: NodeRef<'_>, mode: Option<&QName>) -> Resolution<'_> {
        self.find_rule(node, mode)
            .map_or_else(|| built_in(node), Resolution::Rule)
    }

    /// `xsl:apply-imports`: resolves `node` considering only the rules of
    /// modules imported, directly or transitively, by the module that
    /// declared `current`.
    #[must_use]
    pub fn resolve_imports(
        &self,
        node: NodeRef<'_>,
        mode: Option<&QName>,
        current: &CompiledRule,
    ) -> Resolution<'_> {
        let Some(slot) = self.imports.slot(current.precedence()) else {
            return built_in(node);
        };
        let range = slot.import_range();
        self.search(node, mode, |a| range.contains(&a.rank().precedence))
            .map_or_else(|| built_in(node), Resolution::Rule)
    }

    /// Every stylesheet rule matching `node` in `mode`, in dispatch order.
    /// The first entry is the one [`find_rule`](Self::find_rule) returns.
    #[must_use]
    pub fn candidates(&self, node: NodeRef<'_>, mode: Option<&QName>) -> Vec<&CompiledRule> {
        let mut found: Vec<&CompiledRule> = Vec::new();
        for (_, rule) in self.matching(node, mode) {
            if !found.iter().any(|r| r.id() == rule.id()) {
                found.push(rule);
            }
        }
        found
    }

    /// Looks up a named template. The highest-precedence declaration wins,
    /// which searches the root module first and then its imports in
    /// precedence order.
    #[must_use]
    pub fn named_rule(&self, name: &QName) -> Option<&CompiledRule> {
        self.named.get(name).and_then(|&id| self.rule(id))
    }

    fn search(
        &self,
        node: NodeRef<'_>,
        mode: Option<&QName>,
        admit: impl Fn(&Association) -> bool,
    ) -> Option<&CompiledRule> {
        let mut matches = self.matching(node, mode).filter(|&(a, _)| admit(a));
        let (chosen, rule) = matches.next()?;
        trace!(
            rule = %rule.id(),
            precedence = %chosen.rank().precedence,
            priority = %chosen.rank().priority,
            "rule selected"
        );

        if self.config.report_conflicts {
            let tie = matches.find(|(a, r)| {
                r.id() != rule.id()
                    && a.rank().precedence == chosen.rank().precedence
                    && a.rank().priority == chosen.rank().priority
            });
            if let Some((_, rival)) = tie {
                warn!(
                    node = ?node.name(),
                    chosen = %rule.locator(),
                    rival = %rival.locator(),
                    "ambiguous rule match, using the later declaration"
                );
            }
        }
        Some(rule)
    }

    fn matching<'s>(
        &'s self,
        node: NodeRef<'_>,
        mode: Option<&QName>,
    ) -> impl Iterator<Item = (&'s Association, &'s CompiledRule)> {
        self.index.chain_for(node).iter().filter_map(move |a| {
            let rule = self.rules.get(a.rule().index())?;
            (rule.in_mode(mode) && a.matches(node)).then_some((a, rule))
        })
    }
}

fn built_in(node: NodeRef<'_>) -> Resolution<'static> {
    let rule = BuiltInRule::for_kind(node.kind());
    trace!(%rule, "no stylesheet rule matched");
    Resolution::BuiltIn(rule)
}
