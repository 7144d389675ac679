//! Compiled template rules.

use templar_foundation::{Locator, ModuleId, Precedence, Priority, QName, RuleId};
use templar_stylesheet::{MatchPattern, TemplateBody, TemplateRule};

/// A template rule placed in the composed stylesheet.
///
/// Carries the declaration plus where it ended up: the module that declared
/// it, the precedence of that module's slot, and its position in the slot's
/// flattened declaration order.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    id: RuleId,
    module: ModuleId,
    precedence: Precedence,
    position: usize,
    template: TemplateRule,
}

impl CompiledRule {
    pub(crate) fn new(
        id: RuleId,
        module: ModuleId,
        precedence: Precedence,
        position: usize,
        template: TemplateRule,
    ) -> Self {
        Self {
            id,
            module,
            precedence,
            position,
            template,
        }
    }

    /// Returns the rule id.
    #[must_use]
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the declaring module.
    #[must_use]
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Returns the import precedence.
    #[must_use]
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Returns the document position within the precedence slot.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the declaration.
    #[must_use]
    pub fn template(&self) -> &TemplateRule {
        &self.template
    }

    /// Returns the match pattern, if any.
    #[must_use]
    pub fn pattern(&self) -> Option<&MatchPattern> {
        self.template.pattern.as_ref()
    }

    /// Returns the template name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&QName> {
        self.template.name.as_ref()
    }

    /// Returns the mode, `None` for the default mode.
    #[must_use]
    pub fn mode(&self) -> Option<&QName> {
        self.template.mode.as_ref()
    }

    /// Returns the explicit priority, if declared.
    #[must_use]
    pub fn priority(&self) -> Option<Priority> {
        self.template.priority
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &TemplateBody {
        &self.template.body
    }

    /// Returns where the rule was declared.
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.template.locator
    }

    /// Returns true if the rule applies in `mode`: both default, or both
    /// named and equal.
    #[must_use]
    pub fn in_mode(&self, mode: Option<&QName>) -> bool {
        self.mode() == mode
    }
}
