//! Configuration for recomposition and dispatch.

/// What to do when two declarations at the same import precedence disagree
/// and the language allows an implementation to recover.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the later declaration and emit a warning.
    #[default]
    Recover,
    /// Abort recomposition with a compile error.
    Error,
}

/// Configuration for recomposition.
///
/// Controls how recoverable conflicts are treated and whether dispatch
/// reports ambiguous rule matches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecomposeConfig {
    /// Warn when the selected rule ties with another matching rule.
    pub report_conflicts: bool,

    /// Two different values for one output property at the same precedence.
    pub output_conflicts: ConflictPolicy,

    /// Two aliases for one stylesheet namespace at the same precedence.
    pub namespace_alias_conflicts: ConflictPolicy,
}

impl RecomposeConfig {
    /// Creates the default configuration: recover silently where allowed.
    #[must_use]
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Creates a configuration that rejects every recoverable conflict and
    /// reports ambiguous matches.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            report_conflicts: true,
            output_conflicts: ConflictPolicy::Error,
            namespace_alias_conflicts: ConflictPolicy::Error,
        }
    }

    /// Builder method to enable/disable ambiguity reporting.
    #[must_use]
    pub fn with_report_conflicts(mut self, report: bool) -> Self {
        self.report_conflicts = report;
        self
    }

    /// Builder method to set the output property conflict policy.
    #[must_use]
    pub fn with_output_conflicts(mut self, policy: ConflictPolicy) -> Self {
        self.output_conflicts = policy;
        self
    }

    /// Builder method to set the namespace alias conflict policy.
    #[must_use]
    pub fn with_namespace_alias_conflicts(mut self, policy: ConflictPolicy) -> Self {
        self.namespace_alias_conflicts = policy;
        self
    }
}
