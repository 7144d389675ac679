//! The composed stylesheet.
//!
//! A [`ComposedView`] is the "compiled program": created once by
//! [`recompose`](crate::recompose()), immutable afterwards, and shared
//! read-only between any number of concurrent transforms.

use std::collections::HashMap;

use templar_foundation::{QName, RuleId};
use templar_stylesheet::{
    DecimalSymbols, KeyDecl, NodeKind, NodeRef, OutputProperties, VariableDecl,
};

use crate::config::RecomposeConfig;
use crate::index::PatternIndex;
use crate::precedence::GlobalImportList;
use crate::rule::CompiledRule;
use crate::tables::{AttributeSet, Tables};

/// A recomposed stylesheet: every module merged into one precedence-ordered
/// view with a frozen dispatch index.
#[derive(Clone, Debug)]
pub struct ComposedView {
    pub(crate) imports: GlobalImportList,
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) named: HashMap<QName, RuleId>,
    pub(crate) index: PatternIndex,
    pub(crate) tables: Tables,
    pub(crate) config: RecomposeConfig,
}

impl ComposedView {
    /// The precedence-ordered import list, root first.
    #[must_use]
    pub fn modules(&self) -> &GlobalImportList {
        &self.imports
    }

    /// Every template rule in ascending (precedence, position) order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&CompiledRule> {
        self.rules.get(id.index())
    }

    /// The dispatch index.
    #[must_use]
    pub fn index(&self) -> &PatternIndex {
        &self.index
    }

    /// The configuration the view was built with.
    #[must_use]
    pub fn config(&self) -> &RecomposeConfig {
        &self.config
    }

    /// Merged output properties.
    #[must_use]
    pub fn output(&self) -> &OutputProperties {
        self.tables.output.properties()
    }

    /// Looks up a merged attribute set.
    #[must_use]
    pub fn attribute_set(&self, name: &QName) -> Option<&AttributeSet> {
        self.tables.attribute_sets.get(name)
    }

    /// Looks up a decimal format; `None` names the default format.
    #[must_use]
    pub fn decimal_format(&self, name: Option<&QName>) -> Option<&DecimalSymbols> {
        self.tables.decimal_formats.get(name)
    }

    /// Every declaration of key `name`.
    #[must_use]
    pub fn keys(&self, name: &QName) -> &[KeyDecl] {
        self.tables.keys.get(name)
    }

    /// The result namespace aliased to `stylesheet_namespace`.
    #[must_use]
    pub fn namespace_alias(&self, stylesheet_namespace: &str) -> Option<&str> {
        self.tables.namespace_aliases.get(stylesheet_namespace)
    }

    /// Returns true if whitespace-only text children of `element` are
    /// stripped. Always false for non-element nodes.
    #[must_use]
    pub fn should_strip(&self, element: NodeRef<'_>) -> bool {
        if element.kind() != NodeKind::Element {
            return false;
        }
        element
            .local_name()
            .is_some_and(|local| self.tables.whitespace.strips(element.namespace_uri(), local))
    }

    /// Looks up a global variable or param.
    #[must_use]
    pub fn global_variable(&self, name: &QName) -> Option<&VariableDecl> {
        self.tables.variables.get(name)
    }
}
