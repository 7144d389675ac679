//! Integration tests for the import-graph builder
//!
//! Tests the precedence order produced for import and include trees.

use templar_compose::{GlobalImportList, recompose};
use templar_foundation::{Locator, ModuleId};
use templar_stylesheet::ModuleTree;

fn names(tree: &ModuleTree, order: impl Iterator<Item = ModuleId>) -> Vec<String> {
    order
        .map(|m| tree.module(m).locator().system_id.to_string())
        .collect()
}

#[test]
fn import_precedence_order() {
    // A imports B, C; B imports D; C imports E
    let mut tree = ModuleTree::new(Locator::module("A"));
    let a = tree.root();
    let b = tree.add_import(a, Locator::module("B"));
    let c = tree.add_import(a, Locator::module("C"));
    tree.add_import(b, Locator::module("D"));
    tree.add_import(c, Locator::module("E"));

    let list = GlobalImportList::build(&tree);
    assert_eq!(names(&tree, list.modules()), vec!["A", "C", "E", "B", "D"]);

    let view = recompose(&tree).unwrap();
    assert_eq!(
        names(&tree, view.modules().modules()),
        vec!["A", "C", "E", "B", "D"]
    );
}

#[test]
fn deep_chain_orders_root_first() {
    let mut tree = ModuleTree::new(Locator::module("m0"));
    let mut parent = tree.root();
    for i in 1..6 {
        parent = tree.add_import(parent, Locator::module(&format!("m{i}")));
    }

    let list = GlobalImportList::build(&tree);
    assert_eq!(
        names(&tree, list.modules()),
        vec!["m0", "m1", "m2", "m3", "m4", "m5"]
    );
}

#[test]
fn included_modules_contribute_imports_at_the_include_point() {
    // main imports X, includes inc (which imports Y), then imports Z
    let mut tree = ModuleTree::new(Locator::module("main"));
    let main = tree.root();
    tree.add_import(main, Locator::module("X"));
    let inc = tree.add_include(main, Locator::module("inc"));
    tree.add_import(inc, Locator::module("Y"));
    tree.add_import(main, Locator::module("Z"));

    // own imports first, then those of included modules
    let list = GlobalImportList::build(&tree);
    assert_eq!(names(&tree, list.modules()), vec!["main", "Y", "Z", "X"]);
    assert_eq!(list.precedence_of(inc), list.precedence_of(main));
}
