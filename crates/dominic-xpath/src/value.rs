//! Expression results and the type conversions between them.
//!
//! [`XPath` 1.0 § 1](https://www.w3.org/TR/xpath-10/#section-Introduction)
//! "Evaluating an expression yields an object, which has one of the
//! following four basic types: node-set, boolean, number, string."

use dominic_dom::DomTree;

use crate::ast::BinaryOp;
use crate::lexer::is_xml_whitespace;
use crate::node::XPathNode;

/// The result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nodes in document order, without duplicates.
    NodeSet(Vec<XPathNode>),
    /// A boolean.
    Boolean(bool),
    /// An IEEE 754 double.
    Number(f64),
    /// A string.
    String(String),
}

impl Value {
    /// Name of the value's type, as used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::NodeSet(_) => "node-set",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// [`XPath` 1.0 § 4.3 boolean()](https://www.w3.org/TR/xpath-10/#function-boolean)
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::NodeSet(nodes) => !nodes.is_empty(),
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    /// [`XPath` 1.0 § 4.4 number()](https://www.w3.org/TR/xpath-10/#function-number)
    #[must_use]
    pub fn to_number(&self, tree: &DomTree) -> f64 {
        match self {
            Self::NodeSet(_) => string_to_number(&self.to_string_value(tree)),
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
        }
    }

    /// [`XPath` 1.0 § 4.2 string()](https://www.w3.org/TR/xpath-10/#function-string)
    ///
    /// A node-set converts to the string-value of its first node.
    #[must_use]
    pub fn to_string_value(&self, tree: &DomTree) -> String {
        match self {
            Self::NodeSet(nodes) => nodes
                .first()
                .map(|node| node.string_value(tree))
                .unwrap_or_default(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<XPathNode>> for Value {
    fn from(value: Vec<XPathNode>) -> Self {
        Self::NodeSet(value)
    }
}

/// "A string that consists of optional whitespace followed by an optional
/// minus sign followed by a Number followed by whitespace is converted to
/// the IEEE 754 number that is nearest". Anything else is `NaN`.
#[must_use]
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_xml_whitespace);
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let mut dots = 0;
    let mut has_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => has_digit = true,
            '.' => dots += 1,
            _ => return f64::NAN,
        }
    }
    if !has_digit || dots > 1 {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// [`XPath` 1.0 § 4.2](https://www.w3.org/TR/xpath-10/#function-string)
///
/// Integers print without a decimal point, `NaN` and infinities by name,
/// and no value uses exponent notation.
#[must_use]
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

/// [`XPath` 1.0 § 3.4](https://www.w3.org/TR/xpath-10/#booleans)
///
/// Compare two values with `=`, `!=`, `<`, `<=`, `>` or `>=`. Node-sets
/// compare existentially against the string-values of their nodes.
#[must_use]
pub fn compare(tree: &DomTree, op: BinaryOp, left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::NodeSet(a), Value::NodeSet(b)) => {
            let right_strings: Vec<String> = b.iter().map(|n| n.string_value(tree)).collect();
            a.iter().any(|x| {
                let left = Atom::String(x.string_value(tree));
                right_strings
                    .iter()
                    .any(|y| compare_atoms(op, &left, &Atom::String(y.clone())))
            })
        }
        (Value::NodeSet(nodes), Value::Boolean(b)) => {
            compare_atoms(op, &Atom::Boolean(!nodes.is_empty()), &Atom::Boolean(*b))
        }
        (Value::Boolean(b), Value::NodeSet(nodes)) => {
            compare_atoms(op, &Atom::Boolean(*b), &Atom::Boolean(!nodes.is_empty()))
        }
        (Value::NodeSet(nodes), other) => {
            let other = Atom::from_value(other, tree);
            nodes
                .iter()
                .any(|n| compare_atoms(op, &Atom::from_node(*n, &other, tree), &other))
        }
        (other, Value::NodeSet(nodes)) => {
            let other = Atom::from_value(other, tree);
            nodes
                .iter()
                .any(|n| compare_atoms(op, &other, &Atom::from_node(*n, &other, tree)))
        }
        _ => compare_atoms(
            op,
            &Atom::from_value(left, tree),
            &Atom::from_value(right, tree),
        ),
    }
}

/// A non-node-set operand of a comparison.
enum Atom {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Atom {
    fn from_value(value: &Value, tree: &DomTree) -> Self {
        match value {
            Value::Boolean(b) => Self::Boolean(*b),
            Value::Number(n) => Self::Number(*n),
            Value::String(s) => Self::String(s.clone()),
            Value::NodeSet(_) => Self::String(value.to_string_value(tree)),
        }
    }

    /// A node compared against a number is converted to a number, against
    /// a string to its string-value.
    fn from_node(node: XPathNode, other: &Self, tree: &DomTree) -> Self {
        let text = node.string_value(tree);
        match other {
            Self::Number(_) => Self::Number(string_to_number(&text)),
            _ => Self::String(text),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
        }
    }

    fn to_boolean(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }
}

#[allow(clippy::float_cmp)]
fn compare_atoms(op: BinaryOp, left: &Atom, right: &Atom) -> bool {
    match op {
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let equal = match (left, right) {
                (Atom::Boolean(_), _) | (_, Atom::Boolean(_)) => {
                    left.to_boolean() == right.to_boolean()
                }
                (Atom::Number(_), _) | (_, Atom::Number(_)) => left.to_number() == right.to_number(),
                (Atom::String(a), Atom::String(b)) => a == b,
            };
            // NaN is unequal to everything, itself included.
            if op == BinaryOp::Equal {
                equal
            } else {
                !equal
            }
        }
        BinaryOp::LessThan => left.to_number() < right.to_number(),
        BinaryOp::LessThanOrEqual => left.to_number() <= right.to_number(),
        BinaryOp::GreaterThan => left.to_number() > right.to_number(),
        BinaryOp::GreaterThanOrEqual => left.to_number() >= right.to_number(),
        _ => false,
    }
}
