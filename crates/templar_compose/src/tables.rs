//! Composed declaration tables.
//!
//! Recomposition replays declarations in ascending (precedence, position)
//! order, so each table's `merge` sees the winning declaration last. Most
//! tables simply overwrite; the exceptions are the same-precedence checks and
//! the few set-valued properties that accumulate.

use std::collections::HashMap;

use templar_foundation::{Error, ErrorKind, Locator, Precedence, QName, Result};
use templar_stylesheet::{
    AttributeSetDecl, DecimalFormatDecl, DecimalSymbols, KeyDecl, NameTest, NamespaceAliasDecl,
    OutputDecl, OutputProperties, VariableDecl, WhitespaceDecl, WhitespaceMode,
};
use tracing::warn;

use crate::config::ConflictPolicy;
use crate::index::RankKey;

/// Where a table entry came from.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Origin {
    precedence: Precedence,
    locator: Locator,
}

impl Origin {
    fn new(precedence: Precedence, locator: &Locator) -> Self {
        Self {
            precedence,
            locator: locator.clone(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Merged `xsl:output` properties.
#[derive(Clone, Debug, Default)]
pub struct OutputTable {
    properties: OutputProperties,
    origins: HashMap<&'static str, Origin>,
}

impl OutputTable {
    /// The merged properties. Fields no declaration set stay `None`.
    #[must_use]
    pub fn properties(&self) -> &OutputProperties {
        &self.properties
    }

    pub(crate) fn merge(
        &mut self,
        decl: &OutputDecl,
        precedence: Precedence,
        policy: ConflictPolicy,
    ) -> Result<()> {
        let incoming = &decl.properties;
        let mut fields = FieldMerger {
            origins: &mut self.origins,
            origin: Origin::new(precedence, &decl.locator),
            policy,
        };
        let out = &mut self.properties;
        fields.merge("method", &mut out.method, &incoming.method)?;
        fields.merge("version", &mut out.version, &incoming.version)?;
        fields.merge("encoding", &mut out.encoding, &incoming.encoding)?;
        fields.merge(
            "omit-xml-declaration",
            &mut out.omit_xml_declaration,
            &incoming.omit_xml_declaration,
        )?;
        fields.merge("standalone", &mut out.standalone, &incoming.standalone)?;
        fields.merge(
            "doctype-public",
            &mut out.doctype_public,
            &incoming.doctype_public,
        )?;
        fields.merge(
            "doctype-system",
            &mut out.doctype_system,
            &incoming.doctype_system,
        )?;
        fields.merge("indent", &mut out.indent, &incoming.indent)?;
        fields.merge("media-type", &mut out.media_type, &incoming.media_type)?;

        for name in &incoming.cdata_section_elements {
            if !out.cdata_section_elements.contains(name) {
                out.cdata_section_elements.push(name.clone());
            }
        }
        Ok(())
    }
}

struct FieldMerger<'a> {
    origins: &'a mut HashMap<&'static str, Origin>,
    origin: Origin,
    policy: ConflictPolicy,
}

impl FieldMerger<'_> {
    fn merge<T: Clone + PartialEq>(
        &mut self,
        property: &'static str,
        slot: &mut Option<T>,
        incoming: &Option<T>,
    ) -> Result<()> {
        let Some(value) = incoming else {
            return Ok(());
        };
        if let Some(first) = self.origins.get(property) {
            if first.precedence == self.origin.precedence && slot.as_ref() != Some(value) {
                match self.policy {
                    ConflictPolicy::Error => {
                        return Err(Error::new(ErrorKind::ConflictingOutputProperty {
                            property: property.to_string(),
                            first: first.locator.clone(),
                            second: self.origin.locator.clone(),
                        }));
                    }
                    ConflictPolicy::Recover => warn!(
                        property,
                        first = %first.locator,
                        second = %self.origin.locator,
                        "conflicting output property, using the later value"
                    ),
                }
            }
        }
        *slot = Some(value.clone());
        self.origins.insert(property, self.origin.clone());
        Ok(())
    }
}

// =============================================================================
// Attribute Sets
// =============================================================================

/// A merged attribute set.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSet {
    /// Set name
    pub name: QName,
    /// Used attribute sets, first use first
    pub use_sets: Vec<QName>,
    /// Attributes; a later declaration of the same name replaces in place
    pub attributes: Vec<(QName, String)>,
}

impl AttributeSet {
    fn new(name: QName) -> Self {
        Self {
            name,
            use_sets: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn merge(&mut self, decl: &AttributeSetDecl) {
        for set in &decl.use_sets {
            if !self.use_sets.contains(set) {
                self.use_sets.push(set.clone());
            }
        }
        for (name, value) in &decl.attributes {
            match self.attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => existing.clone_from(value),
                None => self.attributes.push((name.clone(), value.clone())),
            }
        }
    }

    /// Returns the value template of attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Attribute sets by name.
#[derive(Clone, Debug, Default)]
pub struct AttributeSets {
    sets: HashMap<QName, AttributeSet>,
}

impl AttributeSets {
    pub(crate) fn merge(&mut self, decl: &AttributeSetDecl) {
        self.sets
            .entry(decl.name.clone())
            .or_insert_with(|| AttributeSet::new(decl.name.clone()))
            .merge(decl);
    }

    /// Looks up a set.
    #[must_use]
    pub fn get(&self, name: &QName) -> Option<&AttributeSet> {
        self.sets.get(name)
    }

    /// Number of sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if no set was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

// =============================================================================
// Decimal Formats
// =============================================================================

/// The default and named decimal formats.
#[derive(Clone, Debug, Default)]
pub struct DecimalFormats {
    default: DecimalSymbols,
    default_origin: Option<Origin>,
    named: HashMap<QName, (DecimalSymbols, Origin)>,
}

impl DecimalFormats {
    pub(crate) fn merge(&mut self, decl: &DecimalFormatDecl, precedence: Precedence) -> Result<()> {
        let existing = match &decl.name {
            None => self.default_origin.as_ref().map(|o| (&self.default, o)),
            Some(name) => self.named.get(name).map(|(s, o)| (s, o)),
        };
        if let Some((symbols, first)) = existing {
            if first.precedence == precedence {
                if *symbols == decl.symbols {
                    return Ok(());
                }
                return Err(Error::conflicting_decimal_format(
                    decl.name.clone(),
                    first.locator.clone(),
                    decl.locator.clone(),
                ));
            }
        }

        let origin = Origin::new(precedence, &decl.locator);
        match &decl.name {
            None => {
                self.default = decl.symbols.clone();
                self.default_origin = Some(origin);
            }
            Some(name) => {
                self.named
                    .insert(name.clone(), (decl.symbols.clone(), origin));
            }
        }
        Ok(())
    }

    /// Returns the symbols of a format; `None` names the default format,
    /// which always exists.
    #[must_use]
    pub fn get(&self, name: Option<&QName>) -> Option<&DecimalSymbols> {
        match name {
            None => Some(&self.default),
            Some(name) => self.named.get(name).map(|(symbols, _)| symbols),
        }
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Key declarations by name. Keys are additive: every declaration is kept.
#[derive(Clone, Debug, Default)]
pub struct KeyTable {
    keys: HashMap<QName, Vec<KeyDecl>>,
}

impl KeyTable {
    pub(crate) fn merge(&mut self, decl: &KeyDecl) {
        self.keys
            .entry(decl.name.clone())
            .or_default()
            .push(decl.clone());
    }

    /// Returns every declaration of key `name`, lowest precedence first.
    #[must_use]
    pub fn get(&self, name: &QName) -> &[KeyDecl] {
        self.keys.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

// =============================================================================
// Namespace Aliases
// =============================================================================

/// Namespace aliases by stylesheet namespace.
#[derive(Clone, Debug, Default)]
pub struct NamespaceAliases {
    aliases: HashMap<String, (String, Origin)>,
}

impl NamespaceAliases {
    pub(crate) fn merge(
        &mut self,
        decl: &NamespaceAliasDecl,
        precedence: Precedence,
        policy: ConflictPolicy,
    ) -> Result<()> {
        if let Some((result, first)) = self.aliases.get(&decl.stylesheet_namespace) {
            if first.precedence == precedence && *result != decl.result_namespace {
                match policy {
                    ConflictPolicy::Error => {
                        return Err(Error::new(ErrorKind::ConflictingNamespaceAlias {
                            namespace: decl.stylesheet_namespace.clone(),
                            first: first.locator.clone(),
                            second: decl.locator.clone(),
                        }));
                    }
                    ConflictPolicy::Recover => warn!(
                        namespace = %decl.stylesheet_namespace,
                        first = %first.locator,
                        second = %decl.locator,
                        "conflicting namespace aliases, using the later one"
                    ),
                }
            }
        }
        self.aliases.insert(
            decl.stylesheet_namespace.clone(),
            (
                decl.result_namespace.clone(),
                Origin::new(precedence, &decl.locator),
            ),
        );
        Ok(())
    }

    /// Returns the result namespace for `stylesheet_namespace`.
    #[must_use]
    pub fn get(&self, stylesheet_namespace: &str) -> Option<&str> {
        self.aliases
            .get(stylesheet_namespace)
            .map(|(result, _)| result.as_str())
    }
}

// =============================================================================
// Whitespace
// =============================================================================

#[derive(Clone, Debug)]
struct WhitespaceRule {
    test: NameTest,
    mode: WhitespaceMode,
    rank: RankKey,
}

/// `xsl:strip-space` / `xsl:preserve-space` name tests, ranked like
/// template rules.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceRules {
    rules: Vec<WhitespaceRule>,
}

impl WhitespaceRules {
    pub(crate) fn merge(&mut self, decl: &WhitespaceDecl, precedence: Precedence, position: usize) {
        for (alternative, test) in decl.elements.iter().enumerate() {
            self.rules.push(WhitespaceRule {
                test: test.clone(),
                mode: decl.mode,
                rank: RankKey {
                    precedence,
                    priority: test.default_priority(),
                    position,
                    alternative,
                },
            });
        }
    }

    /// Returns true if whitespace-only text children of an element with
    /// the given name are stripped. Defaults to preserve.
    #[must_use]
    pub fn strips(&self, namespace: Option<&str>, local: &str) -> bool {
        self.rules
            .iter()
            .filter(|r| r.test.matches(namespace, local))
            .max_by_key(|r| r.rank)
            .is_some_and(|r| r.mode == WhitespaceMode::Strip)
    }

    /// Returns true if no strip-space or preserve-space was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Global Variables
// =============================================================================

/// Top-level variables and params by name; the highest precedence wins.
#[derive(Clone, Debug, Default)]
pub struct GlobalVariables {
    variables: HashMap<QName, (VariableDecl, Precedence)>,
}

impl GlobalVariables {
    pub(crate) fn merge(&mut self, decl: &VariableDecl, precedence: Precedence) -> Result<()> {
        if let Some((first, at)) = self.variables.get(&decl.name) {
            if *at == precedence {
                return Err(Error::duplicate_global_variable(
                    decl.name.clone(),
                    first.locator.clone(),
                    decl.locator.clone(),
                ));
            }
        }
        self.variables
            .insert(decl.name.clone(), (decl.clone(), precedence));
        Ok(())
    }

    /// Looks up a variable or param.
    #[must_use]
    pub fn get(&self, name: &QName) -> Option<&VariableDecl> {
        self.variables.get(name).map(|(decl, _)| decl)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if no global was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Every composed table of a stylesheet.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tables {
    pub output: OutputTable,
    pub attribute_sets: AttributeSets,
    pub decimal_formats: DecimalFormats,
    pub keys: KeyTable,
    pub namespace_aliases: NamespaceAliases,
    pub whitespace: WhitespaceRules,
    pub variables: GlobalVariables,
}
