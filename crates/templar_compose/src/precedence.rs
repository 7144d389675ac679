//! Import-graph builder.
//!
//! Flattens a [`ModuleTree`] into a [`GlobalImportList`]: one slot per module
//! that has its own import precedence (the root and every imported module).
//! Included modules get no slot; they share the slot of their includer.
//!
//! Precedence is assigned by a post-order walk: a module's imports are
//! visited first (in declaration order), then the module itself. The
//! post-order index is the precedence, so a module outranks everything it
//! imports, and a later import outranks an earlier one. As a consequence the
//! modules a slot imports, transitively, occupy exactly the contiguous
//! precedence range just below it.

use std::ops::Range;

use templar_foundation::{ModuleId, Precedence};
use templar_stylesheet::ModuleTree;
use tracing::debug;

/// One precedence level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImportSlot {
    /// The root or imported module owning this slot.
    pub module: ModuleId,
    /// Its import precedence.
    pub precedence: Precedence,
    /// Lowest precedence among the modules it imports, transitively.
    /// Equal to `precedence` when it imports nothing.
    pub import_floor: Precedence,
}

impl ImportSlot {
    /// The precedence range of everything this slot imports, transitively.
    #[must_use]
    pub fn import_range(&self) -> Range<Precedence> {
        self.import_floor..self.precedence
    }

    /// Returns true if `precedence` belongs to a module this slot imports.
    #[must_use]
    pub fn imports(&self, precedence: Precedence) -> bool {
        self.import_range().contains(&precedence)
    }
}

/// The precedence-ordered module list. Index 0 is the root, the highest
/// precedence.
#[derive(Clone, Debug)]
pub struct GlobalImportList {
    slots: Vec<ImportSlot>,
    by_module: Vec<Option<Precedence>>,
}

impl GlobalImportList {
    /// Builds the import list for `tree`.
    #[must_use]
    pub fn build(tree: &ModuleTree) -> Self {
        let mut order = Vec::with_capacity(tree.len());
        visit(tree, tree.root(), &mut order);

        let mut by_module = vec![None; tree.len()];
        for slot in &order {
            assign(tree, slot.module, slot.precedence, &mut by_module);
        }

        order.reverse();
        debug!(
            modules = tree.len(),
            slots = order.len(),
            "built global import list"
        );
        Self {
            slots: order,
            by_module,
        }
    }

    /// Number of precedence levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: the root always has a slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots from highest to lowest precedence.
    #[must_use]
    pub fn slots(&self) -> &[ImportSlot] {
        &self.slots
    }

    /// Iterates slots from highest to lowest precedence.
    pub fn iter(&self) -> impl Iterator<Item = &ImportSlot> {
        self.slots.iter()
    }

    /// Modules owning a slot, from highest to lowest precedence.
    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.slots.iter().map(|s| s.module)
    }

    /// Returns the precedence of `module`. Included modules report the
    /// precedence of the slot they were flattened into.
    #[must_use]
    pub fn precedence_of(&self, module: ModuleId) -> Option<Precedence> {
        self.by_module.get(module.index()).copied().flatten()
    }

    /// Returns the slot at `precedence`.
    #[must_use]
    pub fn slot(&self, precedence: Precedence) -> Option<&ImportSlot> {
        let rank = usize::try_from(precedence.rank()).ok()?;
        let index = self.slots.len().checked_sub(rank + 1)?;
        self.slots.get(index)
    }

    /// Returns the slot that `module` (or its includer) belongs to.
    #[must_use]
    pub fn slot_of(&self, module: ModuleId) -> Option<&ImportSlot> {
        self.precedence_of(module).and_then(|p| self.slot(p))
    }
}

fn visit(tree: &ModuleTree, module: ModuleId, order: &mut Vec<ImportSlot>) {
    let floor = precedence_at(order.len());
    for import in tree.slot_imports(module) {
        visit(tree, import, order);
    }
    order.push(ImportSlot {
        module,
        precedence: precedence_at(order.len()),
        import_floor: floor,
    });
}

fn assign(
    tree: &ModuleTree,
    module: ModuleId,
    precedence: Precedence,
    by_module: &mut [Option<Precedence>],
) {
    by_module[module.index()] = Some(precedence);
    for site in tree.module(module).includes() {
        assign(tree, site.module, precedence, by_module);
    }
}

fn precedence_at(index: usize) -> Precedence {
    Precedence::new(u32::try_from(index).unwrap_or(u32::MAX))
}
