//! Stylesheet modules and the module tree.
//!
//! A [`ModuleTree`] is an arena of [`Module`]s. The root is the principal
//! stylesheet; every other module was reached from exactly one parent by
//! `xsl:import` or `xsl:include`. Because modules are only ever created as
//! children of an existing module, the tree cannot contain cycles.

use templar_foundation::{Locator, ModuleId};

use crate::declaration::Declaration;

// =============================================================================
// Module
// =============================================================================

/// How a module was reached from its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Linkage {
    /// The principal stylesheet.
    Root,
    /// Reached by `xsl:import`; gets its own precedence.
    Import,
    /// Reached by `xsl:include`; shares its parent's precedence.
    Include,
}

/// Where an `xsl:include` sits among its parent's declarations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IncludeSite {
    /// The included module.
    pub module: ModuleId,
    /// Number of the parent's own declarations preceding the include.
    pub position: usize,
}

/// One physical stylesheet unit.
#[derive(Clone, Debug)]
pub struct Module {
    id: ModuleId,
    locator: Locator,
    parent: Option<ModuleId>,
    linkage: Linkage,
    imports: Vec<ModuleId>,
    includes: Vec<IncludeSite>,
    declarations: Vec<Declaration>,
}

impl Module {
    fn new(id: ModuleId, locator: Locator, parent: Option<ModuleId>, linkage: Linkage) -> Self {
        Self {
            id,
            locator,
            parent,
            linkage,
            imports: Vec::new(),
            includes: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Returns the module id.
    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Returns the module's source locator.
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Returns the importing or including module.
    #[must_use]
    pub fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    /// Returns how this module was reached.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Directly imported modules, in declaration order.
    #[must_use]
    pub fn imports(&self) -> &[ModuleId] {
        &self.imports
    }

    /// Directly included modules, in declaration order.
    #[must_use]
    pub fn includes(&self) -> &[IncludeSite] {
        &self.includes
    }

    /// This module's own declarations, in document order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

// =============================================================================
// ModuleTree
// =============================================================================

/// Arena of stylesheet modules rooted at the principal stylesheet.
#[derive(Clone, Debug)]
pub struct ModuleTree {
    modules: Vec<Module>,
}

impl ModuleTree {
    /// Creates a tree holding only the principal stylesheet.
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            modules: vec![Module::new(ModuleId::new(0), locator, None, Linkage::Root)],
        }
    }

    /// Returns the principal stylesheet.
    #[must_use]
    pub fn root(&self) -> ModuleId {
        ModuleId::new(0)
    }

    /// Returns a module.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Always false: the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterates modules in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Adds a module imported by `parent` after its existing imports.
    pub fn add_import(&mut self, parent: ModuleId, locator: Locator) -> ModuleId {
        let id = self.push(parent, locator, Linkage::Import);
        self.modules[parent.index()].imports.push(id);
        id
    }

    /// Adds a module included by `parent` at its current declaration point.
    pub fn add_include(&mut self, parent: ModuleId, locator: Locator) -> ModuleId {
        let id = self.push(parent, locator, Linkage::Include);
        let host = &mut self.modules[parent.index()];
        let position = host.declarations.len();
        host.includes.push(IncludeSite {
            module: id,
            position,
        });
        id
    }

    /// Appends a declaration to `module`.
    pub fn declare(&mut self, module: ModuleId, declaration: impl Into<Declaration>) {
        self.modules[module.index()]
            .declarations
            .push(declaration.into());
    }

    /// Returns the declarations of `module` in flattened document order:
    /// each included module's declarations are spliced in where the include
    /// appeared, recursively. Each entry names the module that declared it.
    #[must_use]
    pub fn flattened(&self, module: ModuleId) -> Vec<(ModuleId, &Declaration)> {
        let mut out = Vec::new();
        self.flatten_into(module, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, id: ModuleId, out: &mut Vec<(ModuleId, &'a Declaration)>) {
        let module = self.module(id);
        let mut sites = module.includes.iter().peekable();
        for (i, decl) in module.declarations.iter().enumerate() {
            while let Some(site) = sites.next_if(|s| s.position <= i) {
                self.flatten_into(site.module, out);
            }
            out.push((id, decl));
        }
        for site in sites {
            self.flatten_into(site.module, out);
        }
    }

    /// Returns the modules whose precedence slots hang off `module`'s slot:
    /// its own imports followed by the imports of everything it includes,
    /// in include order.
    #[must_use]
    pub fn slot_imports(&self, module: ModuleId) -> Vec<ModuleId> {
        let mut out = Vec::new();
        self.collect_imports(module, &mut out);
        out
    }

    fn collect_imports(&self, id: ModuleId, out: &mut Vec<ModuleId>) {
        let module = self.module(id);
        out.extend_from_slice(&module.imports);
        for site in &module.includes {
            self.collect_imports(site.module, out);
        }
    }

    /// Returns the locators from the root down to `module`.
    #[must_use]
    pub fn lineage(&self, module: ModuleId) -> Vec<&Locator> {
        let mut chain: Vec<_> = std::iter::successors(Some(module), |&id| self.module(id).parent)
            .map(|id| self.module(id).locator())
            .collect();
        chain.reverse();
        chain
    }

    fn push(&mut self, parent: ModuleId, locator: Locator, linkage: Linkage) -> ModuleId {
        let index = u32::try_from(self.modules.len()).unwrap_or(u32::MAX);
        let id = ModuleId::new(index);
        self.modules
            .push(Module::new(id, locator, Some(parent), linkage));
        id
    }
}

// =============================================================================
// Tests
// =============================================================================
