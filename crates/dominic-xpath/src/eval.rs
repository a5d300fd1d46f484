//! Expression evaluation.
//!
//! [`XPath` 1.0 § 2.4 Predicates](https://www.w3.org/TR/xpath-10/#predicates)
//! "A predicate filters a node-set with respect to an axis to produce a new
//! node-set." Positions count along the axis of the step, so a reverse axis
//! numbers the nodes nearest the context node first.

use std::cell::OnceCell;
use std::iter;

use dominic_dom::{DomTree, NodeId, NodeType};

use crate::ast::{Axis, BinaryOp, Expr, NodeTest, Step};
use crate::context::XPathContext;
use crate::error::XPathError;
use crate::node::{DocumentOrder, XPathNode};
use crate::value::{Value, compare};

/// Context node, position and size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Focus {
    pub node: XPathNode,
    pub position: usize,
    pub size: usize,
}

impl Focus {
    pub(crate) const fn new(node: XPathNode) -> Self {
        Self {
            node,
            position: 1,
            size: 1,
        }
    }
}

pub(crate) struct Evaluator<'a> {
    pub tree: &'a DomTree,
    pub context: &'a XPathContext,
    /// Built on the first sort and reused for the rest of the evaluation.
    order: OnceCell<DocumentOrder>,
}

impl<'a> Evaluator<'a> {
    pub(crate) const fn new(tree: &'a DomTree, context: &'a XPathContext) -> Self {
        Self {
            tree,
            context,
            order: OnceCell::new(),
        }
    }

    /// Sort `nodes` into document order and drop duplicates.
    fn sort_document_order(&self, nodes: &mut Vec<XPathNode>) {
        if nodes.len() < 2 {
            return;
        }
        self.order
            .get_or_init(|| DocumentOrder::new(self.tree))
            .sort(nodes);
    }

    pub(crate) fn evaluate(&self, expr: &Expr, focus: Focus) -> Result<Value, XPathError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Literal(s) => Ok(Value::String(s.clone())),
            Expr::Variable(name) => self
                .context
                .variable(name)
                .cloned()
                .ok_or_else(|| XPathError::UndefinedVariable(name.clone())),
            Expr::Negate(operand) => {
                let value = self.evaluate(operand, focus)?;
                Ok(Value::Number(-value.to_number(self.tree)))
            }
            Expr::Binary { op, left, right } => self.evaluate_binary(*op, left, right, focus),
            Expr::Union(left, right) => {
                let mut nodes = self.node_set(left, focus)?;
                nodes.extend(self.node_set(right, focus)?);
                self.sort_document_order(&mut nodes);
                Ok(Value::NodeSet(nodes))
            }
            Expr::Function { name, args } => self.call_function(name, args, focus),
            Expr::Path(path) => {
                let start = if path.absolute {
                    XPathNode::Node(focus.node.root(self.tree))
                } else {
                    focus.node
                };
                Ok(Value::NodeSet(self.apply_steps(vec![start], &path.steps)?))
            }
            Expr::Filter {
                primary,
                predicates,
            } => {
                let mut nodes = self.node_set(primary, focus)?;
                for predicate in predicates {
                    nodes = self.filter(nodes, predicate)?;
                }
                Ok(Value::NodeSet(nodes))
            }
            Expr::FilterPath { filter, steps } => {
                let start = self.node_set(filter, focus)?;
                Ok(Value::NodeSet(self.apply_steps(start, steps)?))
            }
        }
    }

    /// Evaluate `expr`, requiring a node-set.
    pub(crate) fn node_set(
        &self,
        expr: &Expr,
        focus: Focus,
    ) -> Result<Vec<XPathNode>, XPathError> {
        match self.evaluate(expr, focus)? {
            Value::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::Type {
                expected: "node-set",
                found: other.type_name(),
            }),
        }
    }

    fn evaluate_binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        focus: Focus,
    ) -> Result<Value, XPathError> {
        match op {
            BinaryOp::Or => Ok(Value::Boolean(
                self.evaluate(left, focus)?.to_boolean()
                    || self.evaluate(right, focus)?.to_boolean(),
            )),
            BinaryOp::And => Ok(Value::Boolean(
                self.evaluate(left, focus)?.to_boolean()
                    && self.evaluate(right, focus)?.to_boolean(),
            )),
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual => {
                let left = self.evaluate(left, focus)?;
                let right = self.evaluate(right, focus)?;
                Ok(Value::Boolean(compare(self.tree, op, &left, &right)))
            }
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Modulo => {
                let a = self.evaluate(left, focus)?.to_number(self.tree);
                let b = self.evaluate(right, focus)?.to_number(self.tree);
                Ok(Value::Number(match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Subtract => a - b,
                    BinaryOp::Multiply => a * b,
                    BinaryOp::Divide => a / b,
                    _ => a % b,
                }))
            }
        }
    }

    /// Apply each step to every node of the previous result.
    fn apply_steps(
        &self,
        mut nodes: Vec<XPathNode>,
        steps: &[Step],
    ) -> Result<Vec<XPathNode>, XPathError> {
        for step in steps {
            let mut next = Vec::new();
            for &node in &nodes {
                let mut selected: Vec<XPathNode> = self
                    .axis_nodes(step.axis, node)
                    .into_iter()
                    .filter(|&candidate| self.node_test(step.axis, &step.test, candidate))
                    .collect();
                for predicate in &step.predicates {
                    selected = self.filter(selected, predicate)?;
                }
                next.extend(selected);
            }
            self.sort_document_order(&mut next);
            nodes = next;
        }
        Ok(nodes)
    }

    /// Keep the nodes for which `predicate` holds, numbering them from 1 in
    /// the order given.
    #[allow(clippy::float_cmp)]
    fn filter(
        &self,
        nodes: Vec<XPathNode>,
        predicate: &Expr,
    ) -> Result<Vec<XPathNode>, XPathError> {
        let size = nodes.len();
        let mut kept = Vec::new();
        for (index, node) in nodes.into_iter().enumerate() {
            let focus = Focus {
                node,
                position: index + 1,
                size,
            };
            // A number predicate is shorthand for position() = number.
            let keep = match self.evaluate(predicate, focus)? {
                Value::Number(n) => n == count(index + 1),
                other => other.to_boolean(),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    /// The nodes on `axis` from `node`, in axis order.
    fn axis_nodes(&self, axis: Axis, node: XPathNode) -> Vec<XPathNode> {
        let tree = self.tree;
        match (axis, node) {
            (Axis::SelfAxis, _) => vec![node],
            (Axis::Parent, _) => node.parent(tree).map(XPathNode::Node).into_iter().collect(),
            (Axis::Ancestor, _) => self.ancestors(node),
            (Axis::AncestorOrSelf, _) => iter::once(node).chain(self.ancestors(node)).collect(),
            (Axis::Following, _) => self.following(node),
            (Axis::Preceding, _) => self.preceding(node),
            (Axis::Attribute, XPathNode::Node(id)) => tree
                .as_element(id)
                .map(|data| {
                    (0..data.attrs.len())
                        .map(|index| XPathNode::Attribute { owner: id, index })
                        .collect()
                })
                .unwrap_or_default(),
            (Axis::Child, XPathNode::Node(id)) => {
                tree.children(id).iter().map(|&c| XPathNode::Node(c)).collect()
            }
            (Axis::Descendant, XPathNode::Node(id)) => {
                tree.descendants(id).map(XPathNode::Node).collect()
            }
            (Axis::DescendantOrSelf, XPathNode::Node(id)) => iter::once(node)
                .chain(tree.descendants(id).map(XPathNode::Node))
                .collect(),
            (Axis::DescendantOrSelf, XPathNode::Attribute { .. }) => vec![node],
            (Axis::FollowingSibling, XPathNode::Node(id)) => {
                tree.following_siblings(id).map(XPathNode::Node).collect()
            }
            (Axis::PrecedingSibling, XPathNode::Node(id)) => {
                tree.preceding_siblings(id).map(XPathNode::Node).collect()
            }
            // Namespaces are not modelled; attributes have no children,
            // siblings or attributes.
            _ => Vec::new(),
        }
    }

    fn ancestors(&self, node: XPathNode) -> Vec<XPathNode> {
        node.parent(self.tree).map_or_else(Vec::new, |parent| {
            iter::once(parent)
                .chain(self.tree.ancestors(parent))
                .map(XPathNode::Node)
                .collect()
        })
    }

    /// Everything after `node` in document order except its descendants.
    fn following(&self, node: XPathNode) -> Vec<XPathNode> {
        let tree = self.tree;
        let mut out = Vec::new();
        let mut current = match node {
            XPathNode::Attribute { owner, .. } => {
                out.extend(tree.descendants(owner).map(XPathNode::Node));
                owner
            }
            XPathNode::Node(id) => id,
        };
        loop {
            for sibling in tree.following_siblings(current) {
                out.push(XPathNode::Node(sibling));
                out.extend(tree.descendants(sibling).map(XPathNode::Node));
            }
            match tree.parent(current) {
                Some(parent) => current = parent,
                None => return out,
            }
        }
    }

    /// Everything before `node` except its ancestors, nearest first.
    fn preceding(&self, node: XPathNode) -> Vec<XPathNode> {
        let tree = self.tree;
        let mut out = Vec::new();
        let mut current = match node {
            XPathNode::Attribute { owner, .. } => owner,
            XPathNode::Node(id) => id,
        };
        loop {
            for sibling in tree.preceding_siblings(current) {
                let mut subtree: Vec<XPathNode> =
                    tree.descendants(sibling).map(XPathNode::Node).collect();
                subtree.reverse();
                out.extend(subtree);
                out.push(XPathNode::Node(sibling));
            }
            match tree.parent(current) {
                Some(parent) => current = parent,
                None => return out,
            }
        }
    }

    /// [`XPath` 1.0 § 2.3](https://www.w3.org/TR/xpath-10/#node-tests)
    ///
    /// "Every axis has a principal node type." It is attribute for the
    /// attribute axis and element for every other axis.
    fn node_test(&self, axis: Axis, test: &NodeTest, node: XPathNode) -> bool {
        let tree = self.tree;
        let principal = match node {
            XPathNode::Attribute { .. } => axis == Axis::Attribute,
            XPathNode::Node(id) => axis != Axis::Attribute && tree.is_element(id),
        };
        match test {
            NodeTest::Node => true,
            NodeTest::Wildcard => principal,
            NodeTest::Name(name) => principal && node.name(tree) == name,
            NodeTest::PrefixWildcard(prefix) => {
                principal
                    && node
                        .name(tree)
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with(':'))
            }
            NodeTest::Text => self.has_type(node, |t| matches!(t, NodeType::Text(_))),
            NodeTest::Comment => self.has_type(node, |t| matches!(t, NodeType::Comment(_))),
            NodeTest::ProcessingInstruction(_) => false,
        }
    }

    fn has_type(&self, node: XPathNode, check: impl Fn(&NodeType) -> bool) -> bool {
        node.node_id()
            .and_then(|id: NodeId| self.tree.get(id))
            .is_some_and(|n| check(&n.node_type))
    }
}

/// Convert a count or position to an `XPath` number.
#[allow(clippy::cast_precision_loss)]
pub(crate) const fn count(n: usize) -> f64 {
    n as f64
}
