//! Arena-backed in-memory source tree.
//!
//! Nodes are stored in a flat vector and linked by index; node 0 is the
//! document node. Attributes hang off their element and are not on the
//! child axis.

use templar_foundation::QName;

use crate::node::{NodeId, NodeKind, NodeRef, NodeTree};

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    name: Option<QName>,
    content: Option<String>,
    parent: Option<usize>,
    first_child: Option<usize>,
    last_child: Option<usize>,
    next_sibling: Option<usize>,
    attributes: Vec<usize>,
}

impl NodeData {
    fn new(kind: NodeKind, parent: Option<usize>) -> Self {
        Self {
            kind,
            name: None,
            content: None,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            attributes: Vec::new(),
        }
    }
}

/// An in-memory XML tree.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document, None)],
        }
    }

    /// Returns the document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns a handle for `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    /// Number of nodes, attributes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates every node in creation order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(|i| self.node(id(i)))
    }

    /// Appends an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, name: QName) -> NodeId {
        let mut data = NodeData::new(NodeKind::Element, Some(slot(parent)));
        data.name = Some(name);
        self.append(parent, data)
    }

    /// Appends a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append_leaf(parent, NodeKind::Text, None, text)
    }

    /// Appends a CDATA section.
    pub fn append_cdata(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append_leaf(parent, NodeKind::CData, None, text)
    }

    /// Appends a comment.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append_leaf(parent, NodeKind::Comment, None, text)
    }

    /// Appends a processing instruction.
    pub fn append_processing_instruction(
        &mut self,
        parent: NodeId,
        target: &str,
        data: &str,
    ) -> NodeId {
        self.append_leaf(
            parent,
            NodeKind::ProcessingInstruction,
            Some(QName::local(target)),
            data,
        )
    }

    /// Sets an attribute on `element`, replacing an existing value with the
    /// same expanded name.
    pub fn set_attribute(&mut self, element: NodeId, name: QName, value: &str) -> NodeId {
        let owner = slot(element);
        let existing = self.nodes[owner]
            .attributes
            .iter()
            .copied()
            .find(|&a| self.nodes[a].name.as_ref() == Some(&name));
        if let Some(existing) = existing {
            self.nodes[existing].content = Some(value.to_string());
            return id(existing);
        }

        let mut data = NodeData::new(NodeKind::Attribute, Some(owner));
        data.name = Some(name);
        data.content = Some(value.to_string());
        let index = self.nodes.len();
        self.nodes.push(data);
        self.nodes[owner].attributes.push(index);
        id(index)
    }

    fn append_leaf(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: Option<QName>,
        text: &str,
    ) -> NodeId {
        let mut data = NodeData::new(kind, Some(slot(parent)));
        data.name = name;
        data.content = Some(text.to_string());
        self.append(parent, data)
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let parent = slot(parent);
        let index = self.nodes.len();
        self.nodes.push(data);

        match self.nodes[parent].last_child {
            Some(last) => self.nodes[last].next_sibling = Some(index),
            None => self.nodes[parent].first_child = Some(index),
        }
        self.nodes[parent].last_child = Some(index);
        id(index)
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[slot(node)]
    }
}

#[allow(clippy::cast_possible_truncation)]
fn slot(id: NodeId) -> usize {
    id.0 as usize
}

fn id(index: usize) -> NodeId {
    NodeId(index as u64)
}

impl NodeTree for Document {
    fn kind(&self, node: NodeId) -> NodeKind {
        self.data(node).kind
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.data(node).name.as_ref().map(QName::local_name)
    }

    fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        self.data(node).name.as_ref().and_then(QName::namespace)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent.map(id)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).first_child.map(id)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).next_sibling.map(id)
    }

    fn attribute(&self, element: NodeId, namespace: Option<&str>, local: &str) -> Option<NodeId> {
        self.data(element)
            .attributes
            .iter()
            .copied()
            .find(|&a| {
                self.nodes[a]
                    .name
                    .as_ref()
                    .is_some_and(|n| n.matches(namespace, local))
            })
            .map(id)
    }

    fn content(&self, node: NodeId) -> Option<&str> {
        self.data(node).content.as_deref()
    }
}
