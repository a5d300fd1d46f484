//! Element handles.

use std::fmt;
use std::rc::Rc;

use dominic_dom::{AttributesMap, NodeId};
use dominic_markup::{Fragment, parse_fragment_into};

use crate::dom::{Shared, select};
use crate::error::{DomError, Result};
use crate::result_set::ResultSet;

/// A handle on one element of a [`Dom`](crate::Dom).
///
/// Handles do not own their node. Reads go to the current tree and writes
/// change it in place, so every handle on the same node sees them. A node
/// removed by a later mutation stays readable through old handles but is no
/// longer [connected](Element::is_connected).
#[derive(Clone)]
pub struct Element {
    shared: Rc<Shared>,
    node: NodeId,
    tag: String,
    snapshot: AttributesMap,
}

impl Element {
    pub(crate) fn new(shared: Rc<Shared>, node: NodeId) -> Self {
        let (tag, snapshot) = {
            let tree = shared.tree.borrow();
            tree.as_element(node)
                .map(|data| (data.tag_name.clone(), data.attrs.clone()))
                .unwrap_or_default()
        };
        Self {
            shared,
            node,
            tag,
            snapshot,
        }
    }

    /// The tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The node this handle points at.
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.node
    }

    /// The attributes when this handle was created, in markup order.
    #[must_use]
    pub const fn snapshot(&self) -> &AttributesMap {
        &self.snapshot
    }

    /// The current attributes, in markup order.
    #[must_use]
    pub fn attrs(&self) -> AttributesMap {
        self.shared
            .tree
            .borrow()
            .as_element(self.node)
            .map(|data| data.attrs.clone())
            .unwrap_or_default()
    }

    /// The current value of attribute `name`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.shared
            .tree
            .borrow()
            .as_element(self.node)
            .and_then(|data| data.get_attribute(name))
            .map(str::to_string)
    }

    /// Set attribute `name`, adding it at the end if it is new.
    ///
    /// # Panics
    ///
    /// Panics if a guard from [`Dom::tree`](crate::Dom::tree) is still alive.
    pub fn set_attr(&self, name: &str, value: &str) {
        if let Some(data) = self.shared.tree.borrow_mut().as_element_mut(self.node) {
            data.set_attribute(name, value);
        }
    }

    /// Remove attribute `name`. Does nothing if it is absent.
    ///
    /// # Panics
    ///
    /// Panics if a guard from [`Dom::tree`](crate::Dom::tree) is still alive.
    pub fn remove_attr(&self, name: &str) {
        if let Some(data) = self.shared.tree.borrow_mut().as_element_mut(self.node) {
            let _ = data.remove_attribute(name);
        }
    }

    /// The text of the element's direct text children, concatenated.
    /// Text inside child elements is not included.
    #[must_use]
    pub fn text(&self) -> String {
        self.shared.tree.borrow().child_text(self.node)
    }

    /// Replace the content of the first direct text child with `value`,
    /// leaving every other child alone. Without a text child, a new one is
    /// appended.
    ///
    /// # Panics
    ///
    /// Panics if a guard from [`Dom::tree`](crate::Dom::tree) is still alive.
    pub fn set_text(&self, value: &str) {
        let mut tree = self.shared.tree.borrow_mut();
        let first_text = tree
            .children(self.node)
            .iter()
            .copied()
            .find(|&child| tree.as_text(child).is_some());
        match first_text {
            Some(child) => {
                if let Some(data) = tree.as_text_mut(child) {
                    value.clone_into(data);
                }
            }
            None => {
                let text = tree.alloc_text(value);
                tree.append_child(self.node, text);
            }
        }
    }

    /// The element and its subtree serialized as markup.
    #[must_use]
    pub fn html(&self) -> String {
        self.shared.tree.borrow().outer_html(self.node)
    }

    /// The element's children serialized as markup.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.shared.tree.borrow().inner_html(self.node)
    }

    /// Replace the element, tag included, with the nodes parsed from
    /// `markup`, and point this handle at the first new element.
    ///
    /// Other handles on the old node keep pointing at it, now detached.
    /// If the element has no parent the new nodes are created detached.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Parse`] if `markup` holds no element. The
    /// document and this handle are unchanged, though the parsed nodes stay
    /// allocated in the arena, detached.
    ///
    /// # Panics
    ///
    /// Panics if a guard from [`Dom::tree`](crate::Dom::tree) is still alive.
    pub fn set_html(&mut self, markup: &str) -> Result<()> {
        let replacement = {
            let mut tree = self.shared.tree.borrow_mut();
            let Fragment { container, issues } =
                parse_fragment_into(&mut tree, markup, &self.shared.options);
            let Some(replacement) = tree.first_element_child(container) else {
                return Err(DomError::Parse("markup contains no element".to_string()));
            };

            if let Some(parent) = tree.parent(self.node) {
                for child in tree.children(container).to_vec() {
                    tree.insert_before(parent, child, self.node);
                }
                tree.remove_child(parent, self.node);
            }
            tracing::debug!(
                old = self.node.0,
                new = replacement.0,
                issues = issues.len(),
                "replaced element markup"
            );
            replacement
        };

        *self = Self::new(Rc::clone(&self.shared), replacement);
        Ok(())
    }

    /// Descendants matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::MalformedSelector`] for unsupported selector
    /// syntax.
    pub fn find(&self, selector: &str) -> Result<ResultSet> {
        let path = dominic_css::translate_relative(selector)?;
        select(&self.shared, &path, self.node)
    }

    /// The first descendant matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotFound`] when nothing matches, and
    /// [`DomError::MalformedSelector`] as [`Element::find`].
    pub fn get(&self, selector: &str) -> Result<Self> {
        self.find(selector)?.into_iter().next().ok_or_else(|| {
            tracing::debug!(selector, "no match");
            DomError::NotFound {
                selector: selector.to_string(),
            }
        })
    }

    /// The elements selected by a raw `XPath` expression with this element
    /// as the context node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::XPath`] if the expression fails to compile or
    /// does not produce a node-set.
    pub fn xpath(&self, expression: &str) -> Result<ResultSet> {
        select(&self.shared, expression, self.node)
    }

    /// The parent element, if the parent is an element.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = {
            let tree = self.shared.tree.borrow();
            tree.parent(self.node).filter(|&p| tree.is_element(p))?
        };
        Some(Self::new(Rc::clone(&self.shared), parent))
    }

    /// The element children, in order.
    #[must_use]
    pub fn children(&self) -> ResultSet {
        let children: Vec<NodeId> = {
            let tree = self.shared.tree.borrow();
            tree.children(self.node)
                .iter()
                .copied()
                .filter(|&c| tree.is_element(c))
                .collect()
        };
        children
            .into_iter()
            .map(|id| Self::new(Rc::clone(&self.shared), id))
            .collect()
    }

    /// Whether the node is still part of the document.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.tree.borrow().is_connected(self.node)
    }
}

/// Two handles are equal when they point at the same node of the same
/// document.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared) && self.node == other.node
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("node", &self.node)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html())
    }
}
