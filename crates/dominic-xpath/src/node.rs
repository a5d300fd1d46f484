//! The `XPath` view of a [`DomTree`].
//!
//! [`XPath` 1.0 § 5 Data Model](https://www.w3.org/TR/xpath-10/#data-model)
//!
//! Tree nodes map onto root, element, text and comment nodes. Attributes
//! are not tree nodes in dominic, so they are addressed by their owner and
//! their position in its attribute list.

use std::iter;

use dominic_dom::{DomTree, NodeId, NodeType};

/// A node as seen by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPathNode {
    /// A node stored in the tree.
    Node(NodeId),
    /// The attribute at `index` in the attribute list of `owner`.
    Attribute {
        /// The element carrying the attribute.
        owner: NodeId,
        /// Position in the owner's attribute list.
        index: usize,
    },
}

impl XPathNode {
    /// The tree node, if this is not an attribute.
    #[must_use]
    pub const fn node_id(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Attribute { .. } => None,
        }
    }

    /// The element, if this node is one.
    #[must_use]
    pub fn element_id(self, tree: &DomTree) -> Option<NodeId> {
        self.node_id().filter(|&id| tree.is_element(id))
    }

    /// [`XPath` 1.0 § 5](https://www.w3.org/TR/xpath-10/#data-model)
    ///
    /// The string-value: descendant text for root and element nodes, the
    /// value of an attribute, the data of a text or comment node.
    #[must_use]
    pub fn string_value(self, tree: &DomTree) -> String {
        match self {
            Self::Attribute { owner, index } => tree
                .as_element(owner)
                .and_then(|data| data.attrs.get_index(index))
                .map(|(_, value)| value.clone())
                .unwrap_or_default(),
            Self::Node(id) => match tree.get(id).map(|n| &n.node_type) {
                Some(NodeType::Comment(data) | NodeType::Text(data)) => data.clone(),
                Some(_) => tree.text_content(id),
                None => String::new(),
            },
        }
    }

    /// The expanded name: the tag of an element, the name of an attribute,
    /// empty for every other node.
    #[must_use]
    pub fn name(self, tree: &DomTree) -> &str {
        match self {
            Self::Attribute { owner, index } => tree
                .as_element(owner)
                .and_then(|data| data.attrs.get_index(index))
                .map_or("", |(name, _)| name.as_str()),
            Self::Node(id) => tree.as_element(id).map_or("", |data| data.tag_name.as_str()),
        }
    }

    /// The parent: the owner of an attribute, the tree parent otherwise.
    #[must_use]
    pub fn parent(self, tree: &DomTree) -> Option<NodeId> {
        match self {
            Self::Attribute { owner, .. } => Some(owner),
            Self::Node(id) => tree.parent(id),
        }
    }

    /// The root node of the tree this node belongs to.
    ///
    /// For a node that has been detached from the document this is the top
    /// of its detached subtree.
    #[must_use]
    pub fn root(self, tree: &DomTree) -> NodeId {
        let start = match self {
            Self::Attribute { owner, .. } => owner,
            Self::Node(id) => id,
        };
        tree.ancestors(start).last().unwrap_or(start)
    }
}

/// Preorder positions for every node in the arena.
///
/// Trees are numbered one after another, in the order their roots were
/// allocated, so the document comes first and detached subtrees follow.
/// Attributes sort after their owner and before its children.
pub(crate) struct DocumentOrder {
    positions: Vec<usize>,
}

impl DocumentOrder {
    pub(crate) fn new(tree: &DomTree) -> Self {
        let mut positions = vec![usize::MAX; tree.len()];
        let mut next = 0;
        for root in (0..tree.len()).map(NodeId) {
            if tree.parent(root).is_some() {
                continue;
            }
            for id in iter::once(root).chain(tree.descendants(root)) {
                if let Some(slot) = positions.get_mut(id.0) {
                    *slot = next;
                    next += 1;
                }
            }
        }
        Self { positions }
    }

    fn position(&self, id: NodeId) -> usize {
        self.positions.get(id.0).copied().unwrap_or(usize::MAX)
    }

    pub(crate) fn key(&self, node: XPathNode) -> (usize, usize) {
        match node {
            XPathNode::Node(id) => (self.position(id), 0),
            XPathNode::Attribute { owner, index } => (self.position(owner), index + 1),
        }
    }

    /// Sort `nodes` into document order and drop duplicates.
    pub(crate) fn sort(&self, nodes: &mut Vec<XPathNode>) {
        nodes.sort_unstable_by_key(|&node| self.key(node));
        nodes.dedup();
    }
}
