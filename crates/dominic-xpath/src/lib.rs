//! `XPath` 1.0 over dominic node trees.
//!
//! # Scope
//!
//! - **Grammar** ([`XPath` 1.0 § 3](https://www.w3.org/TR/xpath-10/#section-Expressions))
//!   - Location paths with all thirteen axes and their abbreviations
//!   - Predicates, filter expressions, unions, variables
//!   - Boolean, equality, relational and arithmetic operators
//!
//! - **Core library** ([`XPath` 1.0 § 4](https://www.w3.org/TR/xpath-10/#corelib))
//!   - Every node-set, string, boolean and number function
//!
//! Attributes are visible on the attribute axis. Names are compared exactly
//! as written, so HTML parsed with lowercased names is queried in lowercase.
//!
//! # Not Implemented
//!
//! - Namespaces: the namespace axis is always empty and a prefixed name is
//!   matched literally
//! - Processing instructions, which the tree never holds
//!
//! # Example
//!
//! ```
//! use dominic_markup::{ParseOptions, parse_document};
//! use dominic_dom::NodeId;
//! use dominic_xpath::{XPath, XPathContext};
//!
//! let output = parse_document("<ul><li>a</li><li>b</li></ul>", &ParseOptions::default());
//! let xpath = XPath::compile("//li[last()]").unwrap();
//! let values = xpath
//!     .find_values(&output.tree, NodeId::ROOT, &XPathContext::new())
//!     .unwrap();
//! assert_eq!(values, vec!["b".to_string()]);
//! ```

/// Compiled expression tree.
pub mod ast;
/// Variable bindings.
pub mod context;
/// Error type.
pub mod error;
mod eval;
mod functions;
/// Expression tokenizer.
pub mod lexer;
/// The `XPath` data model over a tree.
pub mod node;
/// Expression parser.
pub mod parser;
/// Result values and conversions.
pub mod value;

use std::fmt;
use std::str::FromStr;

pub use ast::Expr;
pub use context::XPathContext;
pub use error::XPathError;
pub use node::XPathNode;
pub use value::Value;

use dominic_dom::{DomTree, NodeId};

use eval::{Evaluator, Focus};

/// A compiled expression, reusable across trees and context nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    expr: Expr,
}

impl XPath {
    /// Parse `source` and check its function calls against the core library.
    ///
    /// # Errors
    ///
    /// Returns [`XPathError::Parse`] for a syntax error, and
    /// [`XPathError::UnknownFunction`] or [`XPathError::Arity`] for a bad
    /// function call.
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let expr = parser::parse(source)?;
        functions::validate(&expr)?;
        tracing::trace!(expression = source, "compiled XPath expression");
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// The text the expression was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate with `node` as the context node.
    ///
    /// # Errors
    ///
    /// Returns [`XPathError::Type`] when an operator needing a node-set gets
    /// another type, and [`XPathError::UndefinedVariable`] for an unbound
    /// variable.
    pub fn evaluate(
        &self,
        tree: &DomTree,
        node: NodeId,
        context: &XPathContext,
    ) -> Result<Value, XPathError> {
        let value = Evaluator::new(tree, context)
            .evaluate(&self.expr, Focus::new(XPathNode::Node(node)))?;
        tracing::trace!(expression = %self.source, result = value.type_name(), "evaluated");
        Ok(value)
    }

    /// Evaluate and require a node-set.
    ///
    /// # Errors
    ///
    /// As [`XPath::evaluate`], plus [`XPathError::Type`] when the result is
    /// not a node-set.
    pub fn find_nodes(
        &self,
        tree: &DomTree,
        node: NodeId,
        context: &XPathContext,
    ) -> Result<Vec<XPathNode>, XPathError> {
        match self.evaluate(tree, node, context)? {
            Value::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::Type {
                expected: "node-set",
                found: other.type_name(),
            }),
        }
    }

    /// The first node of the resulting node-set.
    ///
    /// # Errors
    ///
    /// As [`XPath::find_nodes`].
    pub fn find_node(
        &self,
        tree: &DomTree,
        node: NodeId,
        context: &XPathContext,
    ) -> Result<Option<XPathNode>, XPathError> {
        Ok(self.find_nodes(tree, node, context)?.first().copied())
    }

    /// The string-value of the first node of a node-set result, or the
    /// string conversion of any other result.
    ///
    /// # Errors
    ///
    /// As [`XPath::evaluate`].
    pub fn find_value(
        &self,
        tree: &DomTree,
        node: NodeId,
        context: &XPathContext,
    ) -> Result<Option<String>, XPathError> {
        Ok(match self.evaluate(tree, node, context)? {
            Value::NodeSet(nodes) => nodes.first().map(|n| n.string_value(tree)),
            other => Some(other.to_string_value(tree)),
        })
    }

    /// The string-values of every node of the resulting node-set.
    ///
    /// # Errors
    ///
    /// As [`XPath::find_nodes`].
    pub fn find_values(
        &self,
        tree: &DomTree,
        node: NodeId,
        context: &XPathContext,
    ) -> Result<Vec<String>, XPathError> {
        Ok(self
            .find_nodes(tree, node, context)?
            .into_iter()
            .map(|n| n.string_value(tree))
            .collect())
    }

    /// The elements of the resulting node-set, in document order.
    ///
    /// Text, comment, attribute and root nodes in the result are skipped.
    ///
    /// # Errors
    ///
    /// As [`XPath::find_nodes`].
    pub fn select_elements(
        &self,
        tree: &DomTree,
        node: NodeId,
        context: &XPathContext,
    ) -> Result<Vec<NodeId>, XPathError> {
        Ok(self
            .find_nodes(tree, node, context)?
            .into_iter()
            .filter_map(|n| n.element_id(tree))
            .collect())
    }
}

impl FromStr for XPath {
    type Err = XPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile and evaluate `expression` once, without variables.
///
/// # Errors
///
/// As [`XPath::compile`] and [`XPath::evaluate`].
pub fn evaluate(expression: &str, tree: &DomTree, node: NodeId) -> Result<Value, XPathError> {
    XPath::compile(expression)?.evaluate(tree, node, &XPathContext::new())
}

/// Compile `expression` and return the nodes it selects.
///
/// # Errors
///
/// As [`XPath::compile`] and [`XPath::find_nodes`].
pub fn find_nodes(
    expression: &str,
    tree: &DomTree,
    node: NodeId,
) -> Result<Vec<XPathNode>, XPathError> {
    XPath::compile(expression)?.find_nodes(tree, node, &XPathContext::new())
}

/// Compile `expression` and return the first node it selects.
///
/// # Errors
///
/// As [`XPath::compile`] and [`XPath::find_node`].
pub fn find_node(
    expression: &str,
    tree: &DomTree,
    node: NodeId,
) -> Result<Option<XPathNode>, XPathError> {
    XPath::compile(expression)?.find_node(tree, node, &XPathContext::new())
}

/// Compile `expression` and return its value as a string.
///
/// # Errors
///
/// As [`XPath::compile`] and [`XPath::find_value`].
pub fn find_value(
    expression: &str,
    tree: &DomTree,
    node: NodeId,
) -> Result<Option<String>, XPathError> {
    XPath::compile(expression)?.find_value(tree, node, &XPathContext::new())
}

/// Compile `expression` and return the string-values of the nodes it
/// selects.
///
/// # Errors
///
/// As [`XPath::compile`] and [`XPath::find_values`].
pub fn find_values(
    expression: &str,
    tree: &DomTree,
    node: NodeId,
) -> Result<Vec<String>, XPathError> {
    XPath::compile(expression)?.find_values(tree, node, &XPathContext::new())
}
