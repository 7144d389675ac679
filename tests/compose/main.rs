//! Integration tests for Layer 2: Compose
//!
//! Tests for import precedence, recomposition, and template dispatch.

mod dispatch;
mod precedence;
mod properties;

use templar_foundation::{Locator, Priority, QName};
use templar_stylesheet::{Document, NodeId, TemplateRule};

/// Installs a test subscriber so recovered-conflict warnings show up in
/// failing test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A template rule for `pattern`, located at `system_id:line`.
pub fn rule(pattern: &str, system_id: &str, line: u32) -> TemplateRule {
    TemplateRule::parse_match(pattern)
        .unwrap()
        .at(Locator::at(system_id, line, 1))
}

/// Same as [`rule`] with an explicit priority.
pub fn prioritized(pattern: &str, priority: f64, system_id: &str, line: u32) -> TemplateRule {
    rule(pattern, system_id, line).with_priority(Priority::new(priority).unwrap())
}

/// `<list><item id="1">hello</item><!--note--></list>`
pub struct Sample {
    pub doc: Document,
    pub list: NodeId,
    pub item: NodeId,
    pub id: NodeId,
    pub text: NodeId,
    pub comment: NodeId,
}

pub fn sample() -> Sample {
    let mut doc = Document::new();
    let list = doc.append_element(doc.root(), QName::local("list"));
    let item = doc.append_element(list, QName::local("item"));
    let id = doc.set_attribute(item, QName::local("id"), "1");
    let text = doc.append_text(item, "hello");
    let comment = doc.append_comment(list, "note");
    Sample {
        doc,
        list,
        item,
        id,
        text,
        comment,
    }
}
