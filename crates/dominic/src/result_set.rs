//! Query results.

use std::ops::Index;
use std::slice;
use std::vec;

use crate::element::Element;

/// Elements matched by a query, in document order.
///
/// The set holds handles, not copies: mutating an element through the set
/// changes the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    elements: Vec<Element>,
}

impl ResultSet {
    /// The first element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Element> {
        self.elements.first()
    }

    /// The last element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    /// The element at `index`, counting from 0.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the query matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate in document order.
    #[must_use]
    pub fn iter(&self) -> slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// The elements as a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Element> {
        self.elements
    }
}

impl Index<usize> for ResultSet {
    type Output = Element;

    fn index(&self, index: usize) -> &Element {
        &self.elements[index]
    }
}

impl FromIterator<Element> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = Element;
    type IntoIter = vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Element;
    type IntoIter = slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
