//! Integration tests for the in-memory document
//!
//! Tests navigation and string values through the node capability.

use std::thread;

use templar_foundation::QName;
use templar_stylesheet::{Document, NodeKind, NodeRef, NodeTree};

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn ancestors_run_up_to_the_document() {
    let mut doc = Document::new();
    let a = doc.append_element(doc.root(), QName::local("a"));
    let b = doc.append_element(a, QName::local("b"));
    let c = doc.append_element(b, QName::local("c"));

    let kinds: Vec<_> = doc.node(c).ancestors().map(NodeRef::kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Element, NodeKind::Element, NodeKind::Document]
    );
}

#[test]
fn attribute_parent_is_its_element() {
    let mut doc = Document::new();
    let e = doc.append_element(doc.root(), QName::local("e"));
    let attr = doc.set_attribute(e, QName::local("lang"), "en");

    assert_eq!(doc.node(attr).parent().map(NodeRef::id), Some(e));
    assert_eq!(doc.node(attr).kind(), NodeKind::Attribute);
    assert_eq!(doc.node(attr).string_value(), "en");
}

#[test]
fn element_string_value_concatenates_descendant_text() {
    let mut doc = Document::new();
    let p = doc.append_element(doc.root(), QName::local("p"));
    doc.append_text(p, "one ");
    let b = doc.append_element(p, QName::local("b"));
    doc.append_cdata(b, "two");
    doc.append_comment(p, "ignored");
    doc.append_text(p, " three");

    assert_eq!(doc.node(p).string_value(), "one two three");
    assert_eq!(doc.node(doc.root()).string_value(), "one two three");
}

#[test]
fn document_is_usable_through_the_trait_object() {
    let mut doc = Document::new();
    let e = doc.append_element(doc.root(), QName::new("urn:x", "e"));
    let tree: &dyn NodeTree = &doc;

    assert_eq!(tree.kind(e), NodeKind::Element);
    assert_eq!(tree.local_name(e), Some("e"));
    assert_eq!(tree.namespace_uri(e), Some("urn:x"));
    assert_eq!(tree.parent(e), Some(doc.root()));
    assert_eq!(NodeRef::new(tree, e).name(), Some(QName::new("urn:x", "e")));
}

#[test]
fn iter_visits_every_node() {
    let mut doc = Document::new();
    let e = doc.append_element(doc.root(), QName::local("e"));
    doc.set_attribute(e, QName::local("a"), "1");
    doc.append_text(e, "t");

    assert_eq!(doc.iter().count(), 4);
    assert_eq!(doc.len(), 4);
    assert!(!doc.is_empty());
}

#[test]
fn node_refs_are_read_from_many_threads() {
    let mut doc = Document::new();
    let e = doc.append_element(doc.root(), QName::local("e"));
    doc.append_text(e, "shared");
    let node = doc.node(e);

    thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || node.string_value()))
            .collect();
        for reader in readers {
            assert_eq!(reader.join().unwrap(), "shared");
        }
    });
}
