//! The node capability interface and its arena implementation.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::ptr;

use strum_macros::Display;

use crate::{DomTree, NodeId, NodeType};

/// The coarse kind of a node, as seen by the selector matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    /// An element; the only kind selectors can match.
    Element,
    /// A free-standing attribute node, for trees that model attributes as nodes.
    Attribute,
    /// Character data.
    Text,
    /// A comment.
    Comment,
    /// A CDATA section.
    #[strum(serialize = "CDATA")]
    CData,
    /// The document node at the top of the tree.
    Root,
}

/// What the selector matcher needs to know about a node.
///
/// Implementations are cheap handles (`Copy`) into a tree that outlives them.
/// Two handles compare equal when they refer to the same node, and hash
/// accordingly so the matcher can remember results per node.
pub trait TreeNode: Copy + Eq + Hash {
    /// The kind of this node.
    fn node_type(&self) -> NodeKind;

    /// The tag name of an element, `None` for every other kind.
    fn tag_name(&self) -> Option<&str>;

    /// An attribute value, looked up ASCII case-insensitively by name.
    fn get_attribute(&self, name: &str) -> Option<&str>;

    /// The containing node, `None` at the tree boundary.
    fn parent(&self) -> Option<Self>;

    /// Children in document order.
    fn children(&self) -> impl Iterator<Item = Self>;

    /// Siblings before this node, nearest first.
    fn preceding_siblings(&self) -> impl Iterator<Item = Self>;

    /// The text of a character-data node, or the concatenated descendant text
    /// of an element or document.
    fn text_content(&self) -> Cow<'_, str>;

    /// Whether this node is an element.
    fn is_element(&self) -> bool {
        self.node_type() == NodeKind::Element
    }
}

/// A [`TreeNode`] handle into a [`DomTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Wrap `id` of `tree`.
    #[must_use]
    pub const fn new(tree: &'a DomTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// The arena index of this node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this handle points into.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && ptr::eq(self.tree, other.tree)
    }
}

impl Eq for NodeRef<'_> {}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl TreeNode for NodeRef<'_> {
    fn node_type(&self) -> NodeKind {
        match self.tree.get(self.id).map(|n| &n.node_type) {
            Some(NodeType::Element(_)) => NodeKind::Element,
            Some(NodeType::Text(_)) => NodeKind::Text,
            Some(NodeType::Comment(_)) => NodeKind::Comment,
            Some(NodeType::CData(_)) => NodeKind::CData,
            Some(NodeType::Document) | None => NodeKind::Root,
        }
    }

    fn tag_name(&self) -> Option<&str> {
        self.tree
            .as_element(self.id)
            .map(|data| data.tag_name.as_str())
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.tree.as_element(self.id)?.attribute(name)
    }

    fn parent(&self) -> Option<Self> {
        self.tree.parent(self.id).map(|id| Self::new(self.tree, id))
    }

    fn children(&self) -> impl Iterator<Item = Self> {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .map(move |&id| Self::new(tree, id))
    }

    fn preceding_siblings(&self) -> impl Iterator<Item = Self> {
        let tree = self.tree;
        tree.preceding_siblings(self.id)
            .map(move |id| Self::new(tree, id))
    }

    fn text_content(&self) -> Cow<'_, str> {
        match self.tree.get(self.id).map(|n| &n.node_type) {
            Some(NodeType::Text(data) | NodeType::Comment(data) | NodeType::CData(data)) => {
                Cow::Borrowed(data)
            }
            Some(NodeType::Element(_) | NodeType::Document) => {
                Cow::Owned(self.tree.text_content(self.id))
            }
            None => Cow::Borrowed(""),
        }
    }
}
