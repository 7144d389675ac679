//! Error types for the Templar system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every error here is a compile error: it is raised while a stylesheet is
//! being composed, before any transform runs. Dispatch itself never fails.

use std::fmt;

use thiserror::Error;

use crate::locator::Locator;
use crate::qname::QName;

/// Convenience alias used throughout Templar.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Templar operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a duplicate named template error.
    #[must_use]
    pub fn duplicate_named_template(name: QName, first: Locator, second: Locator) -> Self {
        Self::new(ErrorKind::DuplicateNamedTemplate {
            name,
            first,
            second,
        })
    }

    /// Creates a conflicting decimal-format error.
    #[must_use]
    pub fn conflicting_decimal_format(
        name: Option<QName>,
        first: Locator,
        second: Locator,
    ) -> Self {
        Self::new(ErrorKind::ConflictingDecimalFormat {
            name,
            first,
            second,
        })
    }

    /// Creates a duplicate global variable error.
    #[must_use]
    pub fn duplicate_global_variable(name: QName, first: Locator, second: Locator) -> Self {
        Self::new(ErrorKind::DuplicateGlobalVariable {
            name,
            first,
            second,
        })
    }

    /// Creates a pattern syntax error.
    #[must_use]
    pub fn pattern_syntax(pattern: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PatternSyntax {
            pattern: pattern.to_string(),
            offset,
            message: message.into(),
        })
    }

    /// Returns the location of the offending declaration, if known.
    #[must_use]
    pub fn locator(&self) -> Option<&Locator> {
        match &self.kind {
            ErrorKind::DuplicateNamedTemplate { second, .. }
            | ErrorKind::ConflictingDecimalFormat { second, .. }
            | ErrorKind::DuplicateGlobalVariable { second, .. }
            | ErrorKind::ConflictingOutputProperty { second, .. }
            | ErrorKind::ConflictingNamespaceAlias { second, .. } => Some(second),
            ErrorKind::MissingMatchOrName { location } => Some(location),
            ErrorKind::PatternSyntax { .. } | ErrorKind::Internal(_) => None,
        }
    }
}

/// Categorized compile error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Two templates with one name at the same import precedence.
    #[error("duplicate named template {name} at {second} (first declared at {first})")]
    DuplicateNamedTemplate {
        /// The template name.
        name: QName,
        /// The earlier declaration.
        first: Locator,
        /// The offending declaration.
        second: Locator,
    },

    /// A decimal format redeclared with different values at the same precedence.
    #[error(
        "conflicting decimal-format {} at {second} (first declared at {first})",
        format_name(.name.as_ref())
    )]
    ConflictingDecimalFormat {
        /// The format name, `None` for the default format.
        name: Option<QName>,
        /// The earlier declaration.
        first: Locator,
        /// The offending declaration.
        second: Locator,
    },

    /// Two global variables or params with one name at the same precedence.
    #[error("duplicate global variable {name} at {second} (first declared at {first})")]
    DuplicateGlobalVariable {
        /// The variable name.
        name: QName,
        /// The earlier declaration.
        first: Locator,
        /// The offending declaration.
        second: Locator,
    },

    /// Two different values for one output property at the same precedence.
    #[error("conflicting values for output property {property} at {second} (first declared at {first})")]
    ConflictingOutputProperty {
        /// The property name.
        property: String,
        /// The earlier declaration.
        first: Locator,
        /// The offending declaration.
        second: Locator,
    },

    /// Two aliases for one stylesheet namespace at the same precedence.
    #[error("conflicting namespace aliases for {namespace} at {second} (first declared at {first})")]
    ConflictingNamespaceAlias {
        /// The stylesheet namespace URI being aliased.
        namespace: String,
        /// The earlier declaration.
        first: Locator,
        /// The offending declaration.
        second: Locator,
    },

    /// A match pattern could not be parsed.
    #[error("pattern syntax error at offset {offset} in {pattern:?}: {message}")]
    PatternSyntax {
        /// The pattern text.
        pattern: String,
        /// Byte offset of the problem.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// A template rule with neither a match pattern nor a name.
    #[error("template at {location} has neither a match pattern nor a name")]
    MissingMatchOrName {
        /// The template declaration.
        location: Locator,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_name(name: Option<&QName>) -> String {
    name.map_or_else(|| "#default".to_string(), ToString::to_string)
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// System id of the module that was being composed.
    pub module: Option<String>,
    /// Import/include chain from the root module down to the offending one.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module being composed.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "in {module}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  via {frame}")?;
            }
        }
        Ok(())
    }
}
