//! Integration tests for match patterns
//!
//! Tests the built-in path matcher and union decomposition against a
//! small document.

use templar_foundation::{ErrorKind, Priority, QName, Score};
use templar_stylesheet::{
    Document, MatchPattern, Matcher, NodeId, NodeRef, PathPattern, StepPattern, TargetKey,
};

struct Book {
    doc: Document,
    chapter: NodeId,
    title: NodeId,
    para: NodeId,
    note: NodeId,
    text: NodeId,
}

/// `<book><chapter n="1"><title>T</title><para/><para class="note"/></chapter></book>`
fn book() -> Book {
    let mut doc = Document::new();
    let book = doc.append_element(doc.root(), QName::local("book"));
    let chapter = doc.append_element(book, QName::local("chapter"));
    doc.set_attribute(chapter, QName::local("n"), "1");
    let title = doc.append_element(chapter, QName::local("title"));
    let text = doc.append_text(title, "T");
    let para = doc.append_element(chapter, QName::local("para"));
    let note = doc.append_element(chapter, QName::local("para"));
    doc.set_attribute(note, QName::local("class"), "note");
    Book {
        doc,
        chapter,
        title,
        para,
        note,
        text,
    }
}

fn matches(pattern: &str, b: &Book, node: NodeId) -> bool {
    MatchPattern::parse(pattern).unwrap().matches(b.doc.node(node))
}

// =============================================================================
// Matching
// =============================================================================

#[test]
fn predicates_select_between_siblings() {
    let b = book();
    assert!(matches("para[@class='note']", &b, b.note));
    assert!(!matches("para[@class='note']", &b, b.para));
    assert!(matches("para", &b, b.para));
    assert!(matches("chapter[@n]/para", &b, b.para));
}

#[test]
fn unions_match_any_alternative() {
    let b = book();
    assert!(matches("title | para", &b, b.title));
    assert!(matches("title | para", &b, b.para));
    assert!(!matches("title | para", &b, b.chapter));
    assert!(matches("text() | @*", &b, b.text));
}

#[test]
fn descendant_patterns() {
    let b = book();
    assert!(matches("book//title", &b, b.title));
    assert!(matches("//para", &b, b.note));
    assert!(matches("/book/chapter", &b, b.chapter));
    assert!(!matches("/chapter", &b, b.chapter));
}

#[test]
fn match_score_carries_the_default_priority() {
    let b = book();
    let pattern = PathPattern::parse("chapter/title").unwrap();
    assert_eq!(
        pattern.match_score(b.doc.node(b.title)),
        Score::Match(Priority::COMPLEX)
    );
    assert_eq!(pattern.match_score(b.doc.node(b.para)), Score::NoMatch);
}

#[test]
fn union_alternatives_keep_their_own_hints_and_priorities() {
    let pattern = MatchPattern::parse("title | chapter/para | *").unwrap();
    let summary: Vec<_> = pattern
        .alternatives()
        .iter()
        .map(|s| (s.target_hint(), s.default_priority()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (TargetKey::Name("title".into()), Priority::NAME_TEST),
            (TargetKey::Name("para".into()), Priority::COMPLEX),
            (TargetKey::Wildcard, Priority::KIND_TEST),
        ]
    );
}

// =============================================================================
// Custom Matchers
// =============================================================================

/// Matches elements whose string value is empty.
#[derive(Debug)]
struct EmptyElement;

impl Matcher for EmptyElement {
    fn match_score(&self, node: NodeRef<'_>) -> Score {
        if node.name().is_some() && node.first_child().is_none() {
            Score::Match(Priority::COMPLEX)
        } else {
            Score::NoMatch
        }
    }

    fn target_hint(&self) -> TargetKey {
        TargetKey::Wildcard
    }

    fn default_priority(&self) -> Priority {
        Priority::COMPLEX
    }
}

#[test]
fn custom_matchers_plug_into_match_patterns() {
    let b = book();
    let pattern = MatchPattern::step(EmptyElement);
    assert!(pattern.matches(b.doc.node(b.para)));
    assert!(!pattern.matches(b.doc.node(b.title)));

    let union = MatchPattern::Union(vec![
        StepPattern::new(EmptyElement),
        StepPattern::new(PathPattern::parse("title").unwrap()),
    ]);
    assert!(union.matches(b.doc.node(b.title)));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn syntax_errors_are_compile_errors() {
    for bad in ["", "a |", "para[", "x:y", "@@a"] {
        let err = MatchPattern::parse(bad).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::PatternSyntax { .. }),
            "{bad:?} gave {err}"
        );
    }
}
