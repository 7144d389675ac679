//! The node capability.
//!
//! Dispatch and pattern matching never own the source document. They see it
//! through [`NodeTree`], an object-safe navigation interface addressed by
//! opaque [`NodeId`]s, and pass nodes around as [`NodeRef`] handles.

use std::fmt;

use templar_foundation::QName;

/// Opaque node handle. Its meaning is private to the [`NodeTree`] that issued it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// The XPath node kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// The document (root) node.
    Document,
    /// An element.
    Element,
    /// An attribute. Its parent is the owning element.
    Attribute,
    /// A text node.
    Text,
    /// A CDATA section. Treated as text by patterns and dispatch.
    CData,
    /// A comment.
    Comment,
    /// A processing instruction. Its local name is the target.
    ProcessingInstruction,
    /// A namespace node.
    Namespace,
}

impl NodeKind {
    /// Returns true for text and CDATA nodes.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::CData)
    }

    /// Returns true for kinds that can appear on the child axis.
    #[must_use]
    pub const fn is_child_kind(self) -> bool {
        matches!(
            self,
            Self::Element | Self::Text | Self::CData | Self::Comment | Self::ProcessingInstruction
        )
    }
}

/// Read-only navigation over a source tree.
pub trait NodeTree: Sync {
    /// Kind of the node.
    fn kind(&self, node: NodeId) -> NodeKind;

    /// Local name of elements, attributes, PI targets, and namespace prefixes.
    fn local_name(&self, node: NodeId) -> Option<&str>;

    /// Namespace URI of elements and attributes.
    fn namespace_uri(&self, node: NodeId) -> Option<&str>;

    /// Parent node. Attributes report their owning element.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// First node on the child axis (attributes excluded).
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Next node on the following-sibling axis.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Looks up an attribute of an element by expanded name.
    fn attribute(&self, element: NodeId, namespace: Option<&str>, local: &str) -> Option<NodeId>;

    /// Character content of text, CDATA, attribute, comment, and PI nodes.
    fn content(&self, node: NodeId) -> Option<&str>;
}

/// A node in some [`NodeTree`].
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    tree: &'a dyn NodeTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Creates a handle for `id` in `tree`.
    #[must_use]
    pub fn new(tree: &'a dyn NodeTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Returns the node id.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Returns the node kind.
    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.tree.kind(self.id)
    }

    /// Returns the local name, if the kind has one.
    #[must_use]
    pub fn local_name(self) -> Option<&'a str> {
        self.tree.local_name(self.id)
    }

    /// Returns the namespace URI, if any.
    #[must_use]
    pub fn namespace_uri(self) -> Option<&'a str> {
        self.tree.namespace_uri(self.id)
    }

    /// Returns the expanded name, if the kind has one.
    #[must_use]
    pub fn name(self) -> Option<QName> {
        let local = self.local_name()?;
        Some(QName::new(self.namespace_uri().unwrap_or(""), local))
    }

    /// Returns the parent node.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.tree.parent(self.id).map(|id| self.with_id(id))
    }

    /// Returns the first child.
    #[must_use]
    pub fn first_child(self) -> Option<NodeRef<'a>> {
        self.tree.first_child(self.id).map(|id| self.with_id(id))
    }

    /// Returns the next sibling.
    #[must_use]
    pub fn next_sibling(self) -> Option<NodeRef<'a>> {
        self.tree.next_sibling(self.id).map(|id| self.with_id(id))
    }

    /// Iterates the children in document order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.first_child(), |n| n.next_sibling())
    }

    /// Iterates the ancestors, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Looks up an attribute by expanded name.
    #[must_use]
    pub fn attribute(self, namespace: Option<&str>, local: &str) -> Option<NodeRef<'a>> {
        self.tree
            .attribute(self.id, namespace, local)
            .map(|id| self.with_id(id))
    }

    /// Returns the character content of leaf-like nodes.
    #[must_use]
    pub fn content(self) -> Option<&'a str> {
        self.tree.content(self.id)
    }

    /// Computes the XPath string value.
    ///
    /// For documents and elements this is the concatenation of all
    /// descendant text; for every other kind it is the node's own content.
    #[must_use]
    pub fn string_value(self) -> String {
        match self.kind() {
            NodeKind::Document | NodeKind::Element => {
                let mut out = String::new();
                collect_text(self, &mut out);
                out
            }
            _ => self.content().unwrap_or_default().to_string(),
        }
    }

    fn with_id(self, id: NodeId) -> Self {
        Self {
            tree: self.tree,
            id,
        }
    }
}

fn collect_text(node: NodeRef<'_>, out: &mut String) {
    for child in node.children() {
        match child.kind() {
            NodeKind::Text | NodeKind::CData => out.push_str(child.content().unwrap_or_default()),
            NodeKind::Element => collect_text(child, out),
            _ => {}
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.local_name() {
            Some(name) => write!(f, "{:?}({name}, {:?})", self.kind(), self.id),
            None => write!(f, "{:?}({:?})", self.kind(), self.id),
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::addr_eq(self.tree, other.tree)
    }
}

impl Eq for NodeRef<'_> {}
