//! Top-level stylesheet declarations.
//!
//! Every declaration that takes part in recomposition is one variant of the
//! closed [`Declaration`] enum. Each carries the [`Locator`] it was parsed
//! from so compile errors can point at it.

use std::sync::Arc;

use templar_foundation::{Error, ErrorKind, Locator, Priority, QName, Result};

use crate::pattern::MatchPattern;

// =============================================================================
// Declaration
// =============================================================================

/// A precedence-bearing top-level declaration.
#[derive(Clone, Debug)]
pub enum Declaration {
    /// `xsl:template`
    Template(TemplateRule),
    /// `xsl:attribute-set`
    AttributeSet(AttributeSetDecl),
    /// `xsl:decimal-format`
    DecimalFormat(DecimalFormatDecl),
    /// `xsl:key`
    Key(KeyDecl),
    /// `xsl:namespace-alias`
    NamespaceAlias(NamespaceAliasDecl),
    /// `xsl:output`
    Output(OutputDecl),
    /// `xsl:strip-space` / `xsl:preserve-space`
    Whitespace(WhitespaceDecl),
    /// `xsl:variable` / `xsl:param` at the top level
    Variable(VariableDecl),
}

impl Declaration {
    /// Returns where the declaration was parsed from.
    #[must_use]
    pub fn locator(&self) -> &Locator {
        match self {
            Self::Template(d) => &d.locator,
            Self::AttributeSet(d) => &d.locator,
            Self::DecimalFormat(d) => &d.locator,
            Self::Key(d) => &d.locator,
            Self::NamespaceAlias(d) => &d.locator,
            Self::Output(d) => &d.locator,
            Self::Whitespace(d) => &d.locator,
            Self::Variable(d) => &d.locator,
        }
    }

    /// Returns the element name of the declaration, for diagnostics.
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Template(_) => "xsl:template",
            Self::AttributeSet(_) => "xsl:attribute-set",
            Self::DecimalFormat(_) => "xsl:decimal-format",
            Self::Key(_) => "xsl:key",
            Self::NamespaceAlias(_) => "xsl:namespace-alias",
            Self::Output(_) => "xsl:output",
            Self::Whitespace(d) => match d.mode {
                WhitespaceMode::Strip => "xsl:strip-space",
                WhitespaceMode::Preserve => "xsl:preserve-space",
            },
            Self::Variable(d) => match d.kind {
                VariableKind::Variable => "xsl:variable",
                VariableKind::Param => "xsl:param",
            },
        }
    }
}

impl From<TemplateRule> for Declaration {
    fn from(d: TemplateRule) -> Self {
        Self::Template(d)
    }
}

impl From<AttributeSetDecl> for Declaration {
    fn from(d: AttributeSetDecl) -> Self {
        Self::AttributeSet(d)
    }
}

impl From<DecimalFormatDecl> for Declaration {
    fn from(d: DecimalFormatDecl) -> Self {
        Self::DecimalFormat(d)
    }
}

impl From<KeyDecl> for Declaration {
    fn from(d: KeyDecl) -> Self {
        Self::Key(d)
    }
}

impl From<NamespaceAliasDecl> for Declaration {
    fn from(d: NamespaceAliasDecl) -> Self {
        Self::NamespaceAlias(d)
    }
}

impl From<OutputDecl> for Declaration {
    fn from(d: OutputDecl) -> Self {
        Self::Output(d)
    }
}

impl From<WhitespaceDecl> for Declaration {
    fn from(d: WhitespaceDecl) -> Self {
        Self::Whitespace(d)
    }
}

impl From<VariableDecl> for Declaration {
    fn from(d: VariableDecl) -> Self {
        Self::Variable(d)
    }
}

// =============================================================================
// Template Rule
// =============================================================================

/// Opaque template body, handed back to the transform driver untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateBody(Option<Arc<str>>);

impl TemplateBody {
    /// Wraps body source text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self(Some(text.into()))
    }

    /// Returns the body text, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// A template rule.
///
/// Corresponds to:
/// ```xml
/// <xsl:template match="item" name="show" mode="toc" priority="2">...</xsl:template>
/// ```
#[derive(Clone, Debug)]
pub struct TemplateRule {
    /// Match pattern; `None` for templates only callable by name
    pub pattern: Option<MatchPattern>,
    /// Template name
    pub name: Option<QName>,
    /// Mode; `None` is the default mode
    pub mode: Option<QName>,
    /// Explicit priority
    pub priority: Option<Priority>,
    /// Body
    pub body: TemplateBody,
    /// Source location
    pub locator: Locator,
}

impl TemplateRule {
    /// Creates a template rule with a match pattern.
    #[must_use]
    pub fn matching(pattern: MatchPattern) -> Self {
        Self {
            pattern: Some(pattern),
            name: None,
            mode: None,
            priority: None,
            body: TemplateBody::default(),
            locator: Locator::default(),
        }
    }

    /// Parses `pattern` and creates a template rule for it.
    ///
    /// # Errors
    /// Returns a `PatternSyntax` error if the pattern is malformed.
    pub fn parse_match(pattern: &str) -> Result<Self> {
        Ok(Self::matching(MatchPattern::parse(pattern)?))
    }

    /// Creates a named template without a match pattern.
    #[must_use]
    pub fn named(name: QName) -> Self {
        Self {
            pattern: None,
            name: Some(name),
            mode: None,
            priority: None,
            body: TemplateBody::default(),
            locator: Locator::default(),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: QName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: QName) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets an explicit priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: TemplateBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Checks the template has a match pattern or a name.
    ///
    /// # Errors
    /// Returns `MissingMatchOrName` if it has neither.
    pub fn validate(&self) -> Result<()> {
        if self.pattern.is_none() && self.name.is_none() {
            return Err(Error::new(ErrorKind::MissingMatchOrName {
                location: self.locator.clone(),
            }));
        }
        Ok(())
    }
}

// =============================================================================
// Attribute Set
// =============================================================================

/// `xsl:attribute-set`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSetDecl {
    /// Set name
    pub name: QName,
    /// `use-attribute-sets`
    pub use_sets: Vec<QName>,
    /// Attributes in declaration order, values as opaque templates
    pub attributes: Vec<(QName, String)>,
    /// Source location
    pub locator: Locator,
}

impl AttributeSetDecl {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            use_sets: Vec::new(),
            attributes: Vec::new(),
            locator: Locator::default(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    /// Adds a used attribute set.
    #[must_use]
    pub fn using(mut self, set: QName) -> Self {
        self.use_sets.push(set);
        self
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Decimal Format
// =============================================================================

/// The symbols of a decimal format. Defaults are the XSLT defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecimalSymbols {
    /// `decimal-separator`
    pub decimal_separator: char,
    /// `grouping-separator`
    pub grouping_separator: char,
    /// `infinity`
    pub infinity: String,
    /// `minus-sign`
    pub minus_sign: char,
    /// `NaN`
    pub nan: String,
    /// `percent`
    pub percent: char,
    /// `per-mille`
    pub per_mille: char,
    /// `zero-digit`
    pub zero_digit: char,
    /// `digit`
    pub digit: char,
    /// `pattern-separator`
    pub pattern_separator: char,
}

impl Default for DecimalSymbols {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
            infinity: "Infinity".to_string(),
            minus_sign: '-',
            nan: "NaN".to_string(),
            percent: '%',
            per_mille: '\u{2030}',
            zero_digit: '0',
            digit: '#',
            pattern_separator: ';',
        }
    }
}

/// `xsl:decimal-format`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecimalFormatDecl {
    /// Format name; `None` declares the default format
    pub name: Option<QName>,
    /// Symbols
    pub symbols: DecimalSymbols,
    /// Source location
    pub locator: Locator,
}

impl DecimalFormatDecl {
    /// Creates a declaration with default symbols.
    #[must_use]
    pub fn new(name: Option<QName>) -> Self {
        Self {
            name,
            symbols: DecimalSymbols::default(),
            locator: Locator::default(),
        }
    }

    /// Replaces the symbols.
    #[must_use]
    pub fn with_symbols(mut self, symbols: DecimalSymbols) -> Self {
        self.symbols = symbols;
        self
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Key
// =============================================================================

/// `xsl:key`. The `match` and `use` expressions are opaque here.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyDecl {
    /// Key name
    pub name: QName,
    /// `match` pattern text
    pub match_pattern: String,
    /// `use` expression text
    pub use_expr: String,
    /// Source location
    pub locator: Locator,
}

impl KeyDecl {
    /// Creates a key declaration.
    #[must_use]
    pub fn new(name: QName, match_pattern: &str, use_expr: &str) -> Self {
        Self {
            name,
            match_pattern: match_pattern.to_string(),
            use_expr: use_expr.to_string(),
            locator: Locator::default(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Namespace Alias
// =============================================================================

/// `xsl:namespace-alias`, with prefixes already resolved to URIs.
///
/// The empty string stands for the null namespace (`#default` with no
/// default namespace in scope).
#[derive(Clone, Debug, PartialEq)]
pub struct NamespaceAliasDecl {
    /// Namespace used in the stylesheet
    pub stylesheet_namespace: String,
    /// Namespace to emit in the result
    pub result_namespace: String,
    /// Source location
    pub locator: Locator,
}

impl NamespaceAliasDecl {
    /// Creates an alias declaration.
    #[must_use]
    pub fn new(stylesheet_namespace: &str, result_namespace: &str) -> Self {
        Self {
            stylesheet_namespace: stylesheet_namespace.to_string(),
            result_namespace: result_namespace.to_string(),
            locator: Locator::default(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Output
// =============================================================================

/// `method` of `xsl:output`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputMethod {
    /// `xml`
    Xml,
    /// `html`
    Html,
    /// `text`
    Text,
    /// A vendor method named by a qualified name
    Other(QName),
}

/// Output properties. Unset fields are `None`; composition fills them in
/// from the highest-precedence declaration that sets them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputProperties {
    /// `method`
    pub method: Option<OutputMethod>,
    /// `version`
    pub version: Option<String>,
    /// `encoding`
    pub encoding: Option<String>,
    /// `omit-xml-declaration`
    pub omit_xml_declaration: Option<bool>,
    /// `standalone`
    pub standalone: Option<bool>,
    /// `doctype-public`
    pub doctype_public: Option<String>,
    /// `doctype-system`
    pub doctype_system: Option<String>,
    /// `cdata-section-elements`; unioned across declarations
    pub cdata_section_elements: Vec<QName>,
    /// `indent`
    pub indent: Option<bool>,
    /// `media-type`
    pub media_type: Option<String>,
}

/// `xsl:output`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputDecl {
    /// Properties set by this declaration
    pub properties: OutputProperties,
    /// Source location
    pub locator: Locator,
}

impl OutputDecl {
    /// Creates an output declaration.
    #[must_use]
    pub fn new(properties: OutputProperties) -> Self {
        Self {
            properties,
            locator: Locator::default(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Whitespace
// =============================================================================

/// Whether a whitespace declaration strips or preserves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WhitespaceMode {
    /// `xsl:strip-space`
    Strip,
    /// `xsl:preserve-space`
    Preserve,
}

/// An element name test from `elements="..."`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameTest {
    /// `*`
    Any,
    /// `{uri}*` (written `prefix:*`)
    Namespace(Arc<str>),
    /// A full name
    Name(QName),
}

impl NameTest {
    /// Parses `*`, `{uri}*`, `{uri}local`, or `local`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "*" {
            return Some(Self::Any);
        }
        if let Some(uri) = s
            .strip_suffix('*')
            .and_then(|rest| rest.strip_prefix('{').or_else(|| rest.strip_prefix("Q{")))
            .and_then(|rest| rest.strip_suffix('}'))
        {
            return Some(Self::Namespace(uri.into()));
        }
        QName::parse(s).map(Self::Name)
    }

    /// Parses a whitespace-separated list of name tests.
    #[must_use]
    pub fn parse_list(s: &str) -> Option<Vec<Self>> {
        s.split_whitespace().map(Self::parse).collect()
    }

    /// Default priority, as for the equivalent match pattern.
    #[must_use]
    pub fn default_priority(&self) -> Priority {
        match self {
            Self::Any => Priority::KIND_TEST,
            Self::Namespace(_) => Priority::NAMESPACE_WILDCARD,
            Self::Name(_) => Priority::NAME_TEST,
        }
    }

    /// Returns true if an element with the given name passes the test.
    #[must_use]
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Namespace(uri) => namespace == Some(&**uri),
            Self::Name(name) => name.matches(namespace, local),
        }
    }
}

/// `xsl:strip-space` or `xsl:preserve-space`.
#[derive(Clone, Debug, PartialEq)]
pub struct WhitespaceDecl {
    /// Strip or preserve
    pub mode: WhitespaceMode,
    /// Element name tests
    pub elements: Vec<NameTest>,
    /// Source location
    pub locator: Locator,
}

impl WhitespaceDecl {
    /// Creates an `xsl:strip-space` declaration.
    #[must_use]
    pub fn strip(elements: Vec<NameTest>) -> Self {
        Self {
            mode: WhitespaceMode::Strip,
            elements,
            locator: Locator::default(),
        }
    }

    /// Creates an `xsl:preserve-space` declaration.
    #[must_use]
    pub fn preserve(elements: Vec<NameTest>) -> Self {
        Self {
            mode: WhitespaceMode::Preserve,
            elements,
            locator: Locator::default(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Variable
// =============================================================================

/// Whether a global binding is a variable or a param.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VariableKind {
    /// `xsl:variable`
    Variable,
    /// `xsl:param`
    Param,
}

/// A top-level `xsl:variable` or `xsl:param`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    /// Variable name
    pub name: QName,
    /// Variable or param
    pub kind: VariableKind,
    /// `select` expression text
    pub select: Option<String>,
    /// Source location
    pub locator: Locator,
}

impl VariableDecl {
    /// Creates a global variable.
    #[must_use]
    pub fn variable(name: QName, select: Option<&str>) -> Self {
        Self {
            name,
            kind: VariableKind::Variable,
            select: select.map(str::to_string),
            locator: Locator::default(),
        }
    }

    /// Creates a global param.
    #[must_use]
    pub fn param(name: QName, select: Option<&str>) -> Self {
        Self {
            kind: VariableKind::Param,
            ..Self::variable(name, select)
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
