//! Node tree for the dominic crates.
//!
//! This crate provides an arena-based tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), reduced to what a
//! query-and-mutate facade needs: elements with ordered attributes, text,
//! comments, a document root and detached document fragments.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//! Removing a node only unlinks it; its slot stays allocated, so a [`NodeId`]
//! held elsewhere never dangles and keeps describing the detached subtree.

pub mod serialize;

use std::collections::HashSet;

use indexmap::IndexMap;

/// Map of attribute names to values for an element.
///
/// [§ 4.9.2 Interface NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
/// "A NamedNodeMap has an associated element... attribute list"
///
/// Iteration follows source order: the order attributes appeared in the
/// markup, with newly added attributes at the end.
pub type AttributesMap = IndexMap<String, String>;

/// A type-safe index into the node tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    /// "A DocumentFragment node has an associated host"
    ///
    /// Used as the container when markup is parsed as a fragment.
    DocumentFragment,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments."
    Comment(String),
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
///
/// NOTE: Only the local name and the attribute list are stored. Namespaces
/// are not modelled.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with the given tag name and no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: AttributesMap::new(),
        }
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.get_attribute("class")
            .map(|classlist| classlist.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// [§ 4.9 getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    ///
    /// "Let attr be the result of getting an attribute given qualifiedName and this.
    /// If attr is null, return null. Return attr's value."
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// [§ 4.9 setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// "If attribute is null, create an attribute... append this attribute
    /// to this, and then return. Change attribute to value."
    ///
    /// An existing attribute keeps its position; a new one is appended.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let _ = self.attrs.insert(name.into(), value.into());
    }

    /// [§ 4.9 removeAttribute](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    ///
    /// Removes the attribute, keeping the relative order of the remaining
    /// ones. Returns the removed value, or `None` if it was not present.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attrs.shift_remove(name)
    }
}

/// Arena-based node tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// All nodes live in a contiguous vector and refer to each other by index.
/// Nodes are never freed, only unlinked.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// Allocate a detached element with the given tag name.
    pub fn alloc_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Allocate a detached text node.
    pub fn alloc_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, updating all relationships.
    /// A child that is attached elsewhere is removed from its old parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Inserts `new_child` into `parent` immediately before `reference`.
    /// If `reference` is not a child of `parent`, `new_child` is appended.
    pub fn insert_before(&mut self, parent: NodeId, new_child: NodeId, reference: NodeId) {
        self.detach(new_child);

        let Some(index) = self.child_index(parent, reference) else {
            self.append_child(parent, new_child);
            return;
        };
        self.nodes[parent.0].children.insert(index, new_child);
        self.nodes[new_child.0].parent = Some(parent);
        self.relink_children(parent);
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`. The child keeps its own subtree and its
    /// slot in the arena. Does nothing if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.child_index(parent, child) else {
            return;
        };
        let _ = self.nodes[parent.0].children.remove(index);
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.next_sibling = None;
        node.prev_sibling = None;
        self.relink_children(parent);
    }

    /// [§ 4.2.3 Replace](https://dom.spec.whatwg.org/#concept-node-replace)
    ///
    /// Puts `new_child` where `old_child` was and detaches `old_child`.
    /// Does nothing if `old_child` is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) {
        if new_child == old_child || self.child_index(parent, old_child).is_none() {
            return;
        }
        self.insert_before(parent, new_child, old_child);
        self.remove_child(parent, old_child);
    }

    /// Removes `id` from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
    }

    /// Moves every child of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let moved = std::mem::take(&mut self.nodes[from.0].children);
        for child in moved {
            let node = &mut self.nodes[child.0];
            node.parent = None;
            node.next_sibling = None;
            node.prev_sibling = None;
            self.append_child(to, child);
        }
    }

    /// Removes every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let removed = std::mem::take(&mut self.nodes[id.0].children);
        for child in removed {
            let node = &mut self.nodes[child.0];
            node.parent = None;
            node.next_sibling = None;
            node.prev_sibling = None;
        }
    }

    /// Position of `child` within `parent`'s children.
    fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Recomputes sibling links for all children of `parent`.
    fn relink_children(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        for (i, &child) in children.iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.prev_sibling = i.checked_sub(1).map(|p| children[p]);
            node.next_sibling = children.get(i + 1).copied();
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.2.1 Connected](https://dom.spec.whatwg.org/#connected)
    ///
    /// "An element is connected if its shadow-including root is a document."
    ///
    /// Nodes under a detached fragment or removed by a mutation are not connected.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.is_descendant_of(id, NodeId::ROOT)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
            forward: false,
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.next_sibling(id),
            forward: true,
        }
    }

    /// Iterate over the descendants of `id` in document (pre-)order,
    /// excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Iterate over every node reachable from the document root, root first.
    pub fn iter_all(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(NodeId::ROOT).chain(self.descendants(NodeId::ROOT))
    }

    // ========================================================================
    // Node data
    // ========================================================================

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get mutable text data if this node is a text node.
    pub fn as_text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Text(s) => Some(s),
            _ => None,
        })
    }

    /// Returns true if `id` is an element node.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// "The descendant text content of a node node is the concatenation of the
    /// data of all the Text node descendants of node, in tree order."
    ///
    /// For a text node this is its own data.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// [§ 4.4 Child text content](https://dom.spec.whatwg.org/#concept-child-text-content)
    ///
    /// "The child text content of a node node is the concatenation of the data
    /// of all the Text node children of node, in tree order."
    #[must_use]
    pub fn child_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&c| self.as_text(c))
            .collect()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(NodeId::ROOT)
    }

    /// The first child of `id` that is an element.
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&c| self.is_element(c))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over the siblings of a node in one direction.
pub struct SiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    forward: bool,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = if self.forward {
            self.tree.next_sibling(id)
        } else {
            self.tree.prev_sibling(id)
        };
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
