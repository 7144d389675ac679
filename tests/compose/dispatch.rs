//! Integration tests for template dispatch
//!
//! Tests rule selection, modes, built-in rules, apply-imports, and named
//! template lookup against a composed stylesheet.

use std::thread;

use templar_compose::{BuiltInRule, ComposedView, Resolution, recompose};
use templar_foundation::{Locator, QName};
use templar_stylesheet::{Document, ModuleTree, TemplateRule};

use crate::{init_tracing, prioritized, rule, sample};

fn line(resolution: Resolution<'_>) -> Option<u32> {
    resolution.rule().map(|r| r.locator().line)
}

// =============================================================================
// Rule Selection
// =============================================================================

#[test]
fn selects_most_specific_rule() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("node()", "main.xsl", 1));
    tree.declare(root, rule("*", "main.xsl", 2));
    tree.declare(root, rule("item", "main.xsl", 3));
    tree.declare(root, rule("list/item", "main.xsl", 4));
    tree.declare(root, rule("item[@id]", "main.xsl", 5));
    tree.declare(root, rule("@id", "main.xsl", 6));

    let view = recompose(&tree).unwrap();
    let s = sample();

    // list/item and item[@id] share priority 0.5; the later one wins
    assert_eq!(line(view.resolve(s.doc.node(s.item), None)), Some(5));
    assert_eq!(line(view.resolve(s.doc.node(s.list), None)), Some(2));
    assert_eq!(line(view.resolve(s.doc.node(s.id), None)), Some(6));
    assert_eq!(line(view.resolve(s.doc.node(s.text), None)), Some(1));
    assert_eq!(line(view.resolve(s.doc.node(s.comment), None)), Some(1));
    assert_eq!(
        view.resolve(s.doc.node(s.doc.root()), None),
        Resolution::BuiltIn(BuiltInRule::ProcessRoot)
    );
}

#[test]
fn union_branches_dispatch_independently() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("item | comment()", "main.xsl", 1));
    tree.declare(root, prioritized("*", 0.0, "main.xsl", 2));

    let view = recompose(&tree).unwrap();
    let s = sample();

    // the `item` branch keeps priority 0 and loses to the later `*`
    assert_eq!(line(view.resolve(s.doc.node(s.item), None)), Some(2));
    assert_eq!(line(view.resolve(s.doc.node(s.comment), None)), Some(1));
    assert_eq!(line(view.resolve(s.doc.node(s.list), None)), Some(2));
}

#[test]
fn modes_are_matched_exactly() {
    let toc = QName::local("toc");
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("item", "main.xsl", 1));
    tree.declare(root, rule("item", "main.xsl", 2).with_mode(toc.clone()));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let item = s.doc.node(s.item);

    assert_eq!(line(view.resolve(item, None)), Some(1));
    assert_eq!(line(view.resolve(item, Some(&toc))), Some(2));
    assert_eq!(
        view.resolve(item, Some(&QName::local("index"))),
        Resolution::BuiltIn(BuiltInRule::ProcessChildren)
    );
}

#[test]
fn named_only_templates_never_match_nodes() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, TemplateRule::named(QName::local("header")));

    let view = recompose(&tree).unwrap();
    let s = sample();
    assert!(view.find_rule(s.doc.node(s.item), None).is_none());
    assert!(view.index().is_empty());
    assert!(view.named_rule(&QName::local("header")).is_some());
}

#[test]
fn built_in_rules_by_node_kind() {
    let view = recompose(&ModuleTree::new(Locator::module("empty.xsl"))).unwrap();
    let mut doc = Document::new();
    let e = doc.append_element(doc.root(), QName::local("e"));
    let attr = doc.set_attribute(e, QName::local("a"), "v");
    let text = doc.append_text(e, "t");
    let cdata = doc.append_cdata(e, "c");
    let comment = doc.append_comment(e, "x");
    let pi = doc.append_processing_instruction(e, "target", "data");

    let expected = [
        (doc.root(), BuiltInRule::ProcessRoot),
        (e, BuiltInRule::ProcessChildren),
        (attr, BuiltInRule::CopyStringValue),
        (text, BuiltInRule::CopyStringValue),
        (cdata, BuiltInRule::CopyStringValue),
        (comment, BuiltInRule::Ignore),
        (pi, BuiltInRule::Ignore),
    ];
    for (id, built_in) in expected {
        assert_eq!(view.resolve(doc.node(id), None).built_in(), Some(built_in));
    }
    assert!(BuiltInRule::ProcessRoot.processes_children());
    assert!(!BuiltInRule::Ignore.processes_children());
}

// =============================================================================
// Apply-Imports
// =============================================================================

#[test]
fn apply_imports_walks_down_the_import_chain() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    let lib = tree.add_import(root, Locator::module("lib.xsl"));
    let base = tree.add_import(lib, Locator::module("base.xsl"));
    tree.declare(base, rule("item", "base.xsl", 1));
    tree.declare(lib, rule("item", "lib.xsl", 1));
    tree.declare(root, rule("item", "main.xsl", 1));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let item = s.doc.node(s.item);

    let top = view.resolve(item, None).rule().unwrap();
    assert_eq!(top.module(), root);
    let next = view.resolve_imports(item, None, top).rule().unwrap();
    assert_eq!(next.module(), lib);
    let last = view.resolve_imports(item, None, next).rule().unwrap();
    assert_eq!(last.module(), base);
    assert_eq!(
        view.resolve_imports(item, None, last),
        Resolution::BuiltIn(BuiltInRule::ProcessChildren)
    );
}

#[test]
fn apply_imports_from_an_included_rule_sees_the_includers_imports() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    let inc = tree.add_include(root, Locator::module("inc.xsl"));
    let lib = tree.add_import(root, Locator::module("lib.xsl"));
    tree.declare(inc, rule("item", "inc.xsl", 1));
    tree.declare(lib, rule("*", "lib.xsl", 1));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let item = s.doc.node(s.item);

    let top = view.resolve(item, None).rule().unwrap();
    assert_eq!(top.module(), inc);
    let next = view.resolve_imports(item, None, top).rule().unwrap();
    assert_eq!(next.module(), lib);
}

#[test]
fn apply_imports_keeps_the_mode() {
    let toc = QName::local("toc");
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    let lib = tree.add_import(root, Locator::module("lib.xsl"));
    tree.declare(lib, rule("item", "lib.xsl", 1));
    tree.declare(lib, rule("item", "lib.xsl", 2).with_mode(toc.clone()));
    tree.declare(root, rule("item", "main.xsl", 1).with_mode(toc.clone()));

    let view = recompose(&tree).unwrap();
    let s = sample();
    let item = s.doc.node(s.item);

    let top = view.resolve(item, Some(&toc)).rule().unwrap();
    let next = view.resolve_imports(item, Some(&toc), top);
    assert_eq!(line(next), Some(2));
}

// =============================================================================
// Shared Views
// =============================================================================

#[test]
fn view_is_shared_across_threads() {
    init_tracing();
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("item", "main.xsl", 1));
    let view: ComposedView = recompose(&tree).unwrap();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let s = sample();
                assert_eq!(line(view.resolve(s.doc.node(s.item), None)), Some(1));
                assert!(view.resolve(s.doc.node(s.text), None).is_built_in());
            });
        }
    });
}

#[test]
fn one_document_is_dispatched_from_many_threads() {
    let mut tree = ModuleTree::new(Locator::module("main.xsl"));
    let root = tree.root();
    tree.declare(root, rule("item", "main.xsl", 1));
    let view = recompose(&tree).unwrap();
    let s = sample();
    let item = s.doc.node(s.item);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(line(view.resolve(item, None)), Some(1));
            });
        }
    });
}
