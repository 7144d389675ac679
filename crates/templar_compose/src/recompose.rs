//! Recomposition coordinator.
//!
//! Collects every declaration of every module, tags it with the precedence
//! of its slot and its position in the slot's flattened document order, and
//! replays the lot in ascending order into the composed tables. Replaying low
//! to high means a plain overwrite implements "highest precedence wins"; the
//! tables only need to special-case equal precedence.

use std::collections::HashMap;

use templar_foundation::{
    Error, ErrorContext, ErrorKind, ModuleId, Precedence, QName, Result, RuleId,
};
use templar_stylesheet::{Declaration, ModuleTree, TemplateRule};
use tracing::debug;

use crate::composed::ComposedView;
use crate::config::RecomposeConfig;
use crate::index::PatternIndex;
use crate::precedence::GlobalImportList;
use crate::rule::CompiledRule;
use crate::tables::Tables;

/// Recomposes `tree` with the default configuration.
///
/// # Errors
/// Returns a compile error for any declaration that must be unique at its
/// import precedence but is not.
pub fn recompose(tree: &ModuleTree) -> Result<ComposedView> {
    recompose_with(tree, RecomposeConfig::default())
}

/// Recomposes `tree` with an explicit configuration.
///
/// # Errors
/// Returns a compile error for any declaration that must be unique at its
/// import precedence but is not, and for recoverable conflicts the
/// configuration turns into errors.
pub fn recompose_with(tree: &ModuleTree, config: RecomposeConfig) -> Result<ComposedView> {
    let imports = GlobalImportList::build(tree);

    let mut entries = collect(tree, &imports);
    entries.sort_unstable_by_key(|e| (e.precedence, e.position));

    let mut composer = Composer {
        config: &config,
        rules: Vec::new(),
        named: HashMap::new(),
        tables: Tables::default(),
    };
    for entry in &entries {
        composer
            .replay(entry)
            .map_err(|e| e.with_context(context(tree, entry.module)))?;
    }

    let Composer {
        rules,
        named,
        tables,
        ..
    } = composer;

    let mut builder = PatternIndex::builder();
    for rule in &rules {
        builder.insert(rule);
    }
    let index = builder.finish();

    debug!(
        modules = tree.len(),
        slots = imports.len(),
        declarations = entries.len(),
        rules = rules.len(),
        named = named.len(),
        buckets = index.bucket_count(),
        "recomposed stylesheet"
    );

    Ok(ComposedView {
        imports,
        rules,
        named,
        index,
        tables,
        config,
    })
}

#[derive(Copy, Clone)]
struct Entry<'t> {
    precedence: Precedence,
    position: usize,
    module: ModuleId,
    declaration: &'t Declaration,
}

fn collect<'t>(tree: &'t ModuleTree, imports: &GlobalImportList) -> Vec<Entry<'t>> {
    imports
        .iter()
        .flat_map(|slot| {
            tree.flattened(slot.module)
                .into_iter()
                .enumerate()
                .map(move |(position, (module, declaration))| Entry {
                    precedence: slot.precedence,
                    position,
                    module,
                    declaration,
                })
        })
        .collect()
}

fn context(tree: &ModuleTree, module: ModuleId) -> ErrorContext {
    let lineage = tree.lineage(module);
    let mut context = ErrorContext::new();
    if let Some((own, parents)) = lineage.split_last() {
        context = context.with_module(own.system_id.to_string());
        for frame in parents {
            context = context.with_frame(frame.to_string());
        }
    }
    context
}

struct Composer<'c> {
    config: &'c RecomposeConfig,
    rules: Vec<CompiledRule>,
    named: HashMap<QName, RuleId>,
    tables: Tables,
}

impl Composer<'_> {
    fn replay(&mut self, entry: &Entry<'_>) -> Result<()> {
        let Entry {
            precedence,
            position,
            module,
            declaration,
        } = *entry;

        match declaration {
            Declaration::Template(template) => {
                self.add_rule(template, module, precedence, position)
            }
            Declaration::AttributeSet(decl) => {
                self.tables.attribute_sets.merge(decl);
                Ok(())
            }
            Declaration::DecimalFormat(decl) => {
                self.tables.decimal_formats.merge(decl, precedence)
            }
            Declaration::Key(decl) => {
                self.tables.keys.merge(decl);
                Ok(())
            }
            Declaration::NamespaceAlias(decl) => self.tables.namespace_aliases.merge(
                decl,
                precedence,
                self.config.namespace_alias_conflicts,
            ),
            Declaration::Output(decl) => {
                self.tables
                    .output
                    .merge(decl, precedence, self.config.output_conflicts)
            }
            Declaration::Whitespace(decl) => {
                self.tables.whitespace.merge(decl, precedence, position);
                Ok(())
            }
            Declaration::Variable(decl) => self.tables.variables.merge(decl, precedence),
        }
    }

    fn add_rule(
        &mut self,
        template: &TemplateRule,
        module: ModuleId,
        precedence: Precedence,
        position: usize,
    ) -> Result<()> {
        template.validate()?;
        let id = u32::try_from(self.rules.len())
            .map(RuleId::new)
            .map_err(|_| Error::new(ErrorKind::Internal("too many template rules".into())))?;

        if let Some(name) = &template.name {
            if let Some(first) = self.named.get(name).and_then(|id| self.rules.get(id.index())) {
                if first.precedence() == precedence {
                    return Err(Error::duplicate_named_template(
                        name.clone(),
                        first.locator().clone(),
                        template.locator.clone(),
                    ));
                }
            }
            self.named.insert(name.clone(), id);
        }

        self.rules.push(CompiledRule::new(
            id,
            module,
            precedence,
            position,
            template.clone(),
        ));
        Ok(())
    }
}
