//! Dispatch properties that hold for every composed stylesheet
//!
//! Each test pins one ordering rule of template dispatch. The proptests at
//! the end check the same rules over generated stylesheets.

use proptest::prelude::*;

use templar_compose::{BuiltInRule, recompose};
use templar_foundation::{Locator, QName};
use templar_stylesheet::{ModuleTree, TemplateRule};

use crate::{prioritized, rule, sample};

#[test]
fn higher_priority_wins_within_a_module() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, prioritized("item", 3.0, "main.xsl", 1));
    tree.declare(root, prioritized("item", 1.0, "main.xsl", 2));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let chosen = view.find_rule(s.doc.node(s.item), None).unwrap();
    assert_eq!(chosen.locator().line, 1);
}

#[test]
fn later_declaration_breaks_ties() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("item", "main.xsl", 1));
    tree.declare(root, rule("item", "main.xsl", 2));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let chosen = view.find_rule(s.doc.node(s.item), None).unwrap();
    assert_eq!(chosen.locator().line, 2);
}

#[test]
fn import_precedence_dominates_priority() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    let lib = tree.add_import(root, Locator::module("lib.xsl"));
    tree.declare(lib, prioritized("item", 10.0, "lib.xsl", 1));
    tree.declare(root, prioritized("node()", -5.0, "main.xsl", 1));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let chosen = view.find_rule(s.doc.node(s.item), None).unwrap();
    assert_eq!(chosen.module(), root);
}

#[test]
fn included_rules_share_the_includers_precedence() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("item", "main.xsl", 1));
    let inc = tree.add_include(root, Locator::module("inc.xsl"));
    tree.declare(inc, rule("item", "inc.xsl", 1));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let chosen = view.find_rule(s.doc.node(s.item), None).unwrap();

    // the include comes after main's rule in document order
    assert_eq!(chosen.module(), inc);
    assert_eq!(chosen.precedence(), view.rules()[0].precedence());

    // and before main's rule once main redeclares below the include
    tree.declare(root, rule("item", "main.xsl", 9));
    let view = recompose(&tree).unwrap();
    let chosen = view.find_rule(s.doc.node(s.item), None).unwrap();
    assert_eq!(chosen.locator().line, 9);
}

#[test]
fn wildcard_rules_compete_in_named_buckets() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, prioritized("item", 1.0, "main.xsl", 1));
    tree.declare(root, rule("item", "main.xsl", 2));
    tree.declare(root, prioritized("*", 5.0, "main.xsl", 3));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let chosen = view.find_rule(s.doc.node(s.item), None).unwrap();
    assert_eq!(chosen.locator().line, 3);

    let names: Vec<u32> = view
        .candidates(s.doc.node(s.item), None)
        .iter()
        .map(|r| r.locator().line)
        .collect();
    assert_eq!(names, vec![3, 1, 2]);
}

#[test]
fn unmatched_nodes_fall_back_to_built_ins() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("para", "main.xsl", 1));

    let view = recompose(&tree).unwrap();
    let s = sample();
    assert_eq!(
        view.resolve(s.doc.node(s.text), None).built_in(),
        Some(BuiltInRule::CopyStringValue)
    );
    assert_eq!(
        view.resolve(s.doc.node(s.item), None).built_in(),
        Some(BuiltInRule::ProcessChildren)
    );
    assert_eq!(
        view.resolve(s.doc.node(s.doc.root()), None).built_in(),
        Some(BuiltInRule::ProcessRoot)
    );
}

#[test]
fn named_lookup_prefers_the_importer() {
    let name = QName::local("banner");
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    let b = tree.add_import(root, Locator::module("b.xsl"));
    let c = tree.add_import(root, Locator::module("c.xsl"));
    let d = tree.add_import(b, Locator::module("d.xsl"));
    tree.declare(d, TemplateRule::named(name.clone()));
    tree.declare(b, TemplateRule::named(name.clone()));
    tree.declare(c, TemplateRule::named(name.clone()));

    // c is imported last, so it outranks b and everything b imports
    let view = recompose(&tree).unwrap();
    assert_eq!(view.named_rule(&name).unwrap().module(), c);

    tree.declare(root, TemplateRule::named(name.clone()));
    let view = recompose(&tree).unwrap();
    assert_eq!(view.named_rule(&name).unwrap().module(), root);
    assert!(view.named_rule(&QName::local("missing")).is_none());
}

// =============================================================================
// Property Tests
// =============================================================================

const PATTERNS: &[&str] = &["item", "list", "*", "node()", "text()", "list/item", "@id"];
const MODES: &[&str] = &["toc", "index"];

type Decl = (usize, usize, Option<i8>, Option<usize>);

/// The default mode followed by every mode a generated rule can use.
fn modes() -> Vec<Option<QName>> {
    std::iter::once(None)
        .chain(MODES.iter().map(|m| Some(QName::local(m))))
        .collect()
}

fn build(decls: &[Decl], imports: usize) -> ModuleTree {
    let mut tree = ModuleTree::new(Locator::module("m0.xsl"));
    let mut modules = vec![tree.root()];
    for i in 1..=imports {
        let parent = modules[(i - 1) / 2];
        modules.push(tree.add_import(parent, Locator::module(&format!("m{i}.xsl"))));
    }
    for (line, &(module, pattern, priority, mode)) in decls.iter().enumerate() {
        let module = modules[module % modules.len()];
        let line = u32::try_from(line).unwrap();
        let pattern = PATTERNS[pattern % PATTERNS.len()];
        let mut decl = match priority {
            Some(p) => prioritized(pattern, f64::from(p), "gen.xsl", line),
            None => rule(pattern, "gen.xsl", line),
        };
        if let Some(m) = mode {
            decl = decl.with_mode(QName::local(MODES[m]));
        }
        tree.declare(module, decl);
    }
    tree
}

fn stylesheet() -> impl Strategy<Value = ModuleTree> {
    (
        prop::collection::vec(
            (
                0usize..8,
                0usize..16,
                prop::option::of(-3i8..3),
                prop::option::of(0..MODES.len()),
            ),
            0..24,
        ),
        0usize..6,
    )
        .prop_map(|(decls, imports)| build(&decls, imports))
}

proptest! {
    #[test]
    fn recomposition_is_deterministic(tree in stylesheet()) {
        let first = recompose(&tree).unwrap();
        let second = recompose(&tree).unwrap();
        let s = sample();
        for id in [s.list, s.item, s.id, s.text, s.comment, s.doc.root()] {
            let node = s.doc.node(id);
            for mode in modes() {
                let a = first.resolve(node, mode.as_ref());
                let b = second.resolve(node, mode.as_ref());
                prop_assert_eq!(a.rule().map(|r| r.id()), b.rule().map(|r| r.id()));
                prop_assert_eq!(a.built_in(), b.built_in());
            }
        }
    }

    #[test]
    fn selected_rule_outranks_every_candidate(tree in stylesheet()) {
        let view = recompose(&tree).unwrap();
        let s = sample();
        for id in [s.list, s.item, s.id, s.text, s.comment] {
            let node = s.doc.node(id);
            for mode in modes() {
                let candidates = view.candidates(node, mode.as_ref());
                prop_assert!(candidates.iter().all(|r| r.mode() == mode.as_ref()));
                match view.find_rule(node, mode.as_ref()) {
                    None => prop_assert!(candidates.is_empty()),
                    Some(chosen) => {
                        prop_assert_eq!(candidates[0].id(), chosen.id());
                        for other in &candidates[1..] {
                            prop_assert!(other.precedence() <= chosen.precedence());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn apply_imports_never_climbs(tree in stylesheet()) {
        let view = recompose(&tree).unwrap();
        let s = sample();
        let node = s.doc.node(s.item);
        for mode in modes() {
            let mut current = view.find_rule(node, mode.as_ref());
            while let Some(rule) = current {
                let next = view.resolve_imports(node, mode.as_ref(), rule).rule();
                if let Some(next) = next {
                    prop_assert!(next.precedence() < rule.precedence());
                    prop_assert_eq!(next.mode(), mode.as_ref());
                }
                current = next;
            }
        }
    }
}
