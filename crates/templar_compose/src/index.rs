//! Pattern index: the dispatch table.
//!
//! Rules are bucketed by the target hint of each match-pattern alternative.
//! Element and attribute patterns key off their local name; text, comment,
//! processing-instruction and document patterns have pseudo-buckets; patterns
//! that could match any name go on the wildcard chain.
//!
//! Every chain is kept sorted by descending [`RankKey`]: import precedence
//! first, then priority, then document position. [`IndexBuilder::finish`]
//! copies every wildcard association into every concrete bucket, so a lookup
//! only ever walks one chain.

use std::collections::HashMap;
use std::sync::Arc;

use templar_foundation::{Precedence, Priority, RuleId};
use templar_stylesheet::{NodeKind, NodeRef, StepPattern, TargetKey};
use tracing::{debug, trace};

use crate::rule::CompiledRule;

// =============================================================================
// RankKey
// =============================================================================

/// Sort key of an association. Larger keys are tried first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RankKey {
    /// Import precedence of the declaring module.
    pub precedence: Precedence,
    /// Explicit priority, or the alternative's default priority.
    pub priority: Priority,
    /// Document position within the precedence slot.
    pub position: usize,
    /// Index of the alternative within a union pattern.
    pub alternative: usize,
}

// =============================================================================
// Association
// =============================================================================

/// One (rule, pattern alternative) pair placed in a bucket.
#[derive(Clone, Debug)]
pub struct Association {
    rule: RuleId,
    pattern: StepPattern,
    target: TargetKey,
    rank: RankKey,
}

impl Association {
    /// The rule this alternative belongs to.
    #[must_use]
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// The pattern alternative.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// The bucket the alternative was declared for.
    #[must_use]
    pub fn target(&self) -> &TargetKey {
        &self.target
    }

    /// True for wildcard associations, including copies propagated into a
    /// concrete bucket.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.target.is_wildcard()
    }

    /// The sort key.
    #[must_use]
    pub fn rank(&self) -> RankKey {
        self.rank
    }

    /// Returns true if the alternative matches `node`.
    #[must_use]
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.pattern.matches(node)
    }
}

// =============================================================================
// Chain
// =============================================================================

/// A bucket's associations in dispatch order.
#[derive(Clone, Debug, Default)]
pub struct Chain {
    entries: Vec<Association>,
}

impl Chain {
    fn insert(&mut self, association: Association) {
        let at = self
            .entries
            .partition_point(|e| e.rank > association.rank);
        self.entries.insert(at, association);
    }

    /// Number of associations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates associations in dispatch order.
    pub fn iter(&self) -> std::slice::Iter<'_, Association> {
        self.entries.iter()
    }

    /// Associations in dispatch order.
    #[must_use]
    pub fn as_slice(&self) -> &[Association] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Association;
    type IntoIter = std::slice::Iter<'a, Association>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// PatternIndex
// =============================================================================

/// The frozen dispatch table of a composed stylesheet.
#[derive(Clone, Debug, Default)]
pub struct PatternIndex {
    names: HashMap<Arc<str>, Chain>,
    text: Option<Chain>,
    comment: Option<Chain>,
    processing_instruction: Option<Chain>,
    document: Option<Chain>,
    wildcard: Chain,
}

impl PatternIndex {
    /// Starts building an index.
    #[must_use]
    pub fn builder() -> IndexBuilder {
        IndexBuilder::default()
    }

    /// Returns the chain to walk for `node`: its dedicated bucket if one
    /// exists, else the wildcard chain.
    #[must_use]
    pub fn chain_for(&self, node: NodeRef<'_>) -> &Chain {
        let bucket = match node.kind() {
            NodeKind::Element | NodeKind::Attribute => {
                node.local_name().and_then(|name| self.names.get(name))
            }
            NodeKind::Text | NodeKind::CData => self.text.as_ref(),
            NodeKind::Comment => self.comment.as_ref(),
            NodeKind::ProcessingInstruction => self.processing_instruction.as_ref(),
            NodeKind::Document => self.document.as_ref(),
            NodeKind::Namespace => None,
        };
        bucket.unwrap_or(&self.wildcard)
    }

    /// Returns the dedicated bucket for `key`, or the wildcard chain for
    /// [`TargetKey::Wildcard`].
    #[must_use]
    pub fn bucket(&self, key: &TargetKey) -> Option<&Chain> {
        match key {
            TargetKey::Name(name) => self.names.get(name),
            TargetKey::Text => self.text.as_ref(),
            TargetKey::Comment => self.comment.as_ref(),
            TargetKey::ProcessingInstruction => self.processing_instruction.as_ref(),
            TargetKey::Document => self.document.as_ref(),
            TargetKey::Wildcard => Some(&self.wildcard),
        }
    }

    /// The wildcard chain.
    #[must_use]
    pub fn wildcard(&self) -> &Chain {
        &self.wildcard
    }

    /// Number of concrete (non-wildcard) buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.names.len() + self.pseudo().count()
    }

    /// Total associations across every chain, propagated copies included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.values().chain(self.pseudo()).map(Chain::len).sum::<usize>()
            + self.wildcard.len()
    }

    /// Returns true if no rule was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pseudo(&self) -> impl Iterator<Item = &Chain> {
        [
            &self.text,
            &self.comment,
            &self.processing_instruction,
            &self.document,
        ]
        .into_iter()
        .flatten()
    }
}

// =============================================================================
// IndexBuilder
// =============================================================================

/// Accumulates associations; [`finish`](Self::finish) propagates wildcards
/// and freezes the index.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: PatternIndex,
}

impl IndexBuilder {
    /// Inserts one association per alternative of `rule`'s match pattern.
    /// Rules without a pattern are callable by name only and are skipped.
    pub fn insert(&mut self, rule: &CompiledRule) {
        let Some(pattern) = rule.pattern() else {
            return;
        };
        for (alternative, step) in pattern.alternatives().iter().enumerate() {
            let priority = rule.priority().unwrap_or_else(|| step.default_priority());
            let association = Association {
                rule: rule.id(),
                pattern: step.clone(),
                target: step.target_hint(),
                rank: RankKey {
                    precedence: rule.precedence(),
                    priority,
                    position: rule.position(),
                    alternative,
                },
            };
            trace!(
                rule = %rule.id(),
                bucket = %association.target,
                %priority,
                "inserting association"
            );
            let target = association.target.clone();
            self.chain_mut(&target).insert(association);
        }
    }

    /// Copies every wildcard association into every concrete bucket and
    /// returns the frozen index. The wildcard chain itself is kept for nodes
    /// without a dedicated bucket.
    #[must_use]
    pub fn finish(self) -> PatternIndex {
        let mut index = self.index;
        let PatternIndex {
            names,
            text,
            comment,
            processing_instruction,
            document,
            wildcard,
        } = &mut index;

        if !wildcard.is_empty() {
            let concrete = names.values_mut().chain(
                [text, comment, processing_instruction, document]
                    .into_iter()
                    .filter_map(Option::as_mut),
            );
            for chain in concrete {
                for association in wildcard.iter() {
                    chain.insert(association.clone());
                }
            }
        }

        debug!(
            buckets = index.bucket_count(),
            wildcards = index.wildcard.len(),
            associations = index.len(),
            "pattern index finished"
        );
        index
    }

    fn chain_mut(&mut self, key: &TargetKey) -> &mut Chain {
        let index = &mut self.index;
        match key {
            TargetKey::Name(name) => index.names.entry(Arc::clone(name)).or_default(),
            TargetKey::Text => index.text.get_or_insert_with(Chain::default),
            TargetKey::Comment => index.comment.get_or_insert_with(Chain::default),
            TargetKey::ProcessingInstruction => index
                .processing_instruction
                .get_or_insert_with(Chain::default),
            TargetKey::Document => index.document.get_or_insert_with(Chain::default),
            TargetKey::Wildcard => &mut index.wildcard,
        }
    }
}
