//! Compiled expression tree.
//!
//! [`XPath` 1.0 § 3](https://www.w3.org/TR/xpath-10/#section-Expressions)

use strum_macros::{Display, EnumString, IntoStaticStr};

/// An `XPath` expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(f64),
    /// A string literal.
    Literal(String),
    /// A `$name` reference.
    Variable(String),
    /// A binary operator applied to two operands.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    /// `left | right`.
    Union(Box<Expr>, Box<Expr>),
    /// A function call.
    Function {
        /// Function name as written.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// A location path.
    Path(LocationPath),
    /// A primary expression followed by predicates, e.g. `(//a)[1]`.
    Filter {
        /// The filtered expression.
        primary: Box<Expr>,
        /// Predicates applied in document order.
        predicates: Vec<Expr>,
    },
    /// A filter expression followed by a relative path, e.g. `$nodes/b`.
    FilterPath {
        /// The expression producing the starting node-set.
        filter: Box<Expr>,
        /// Steps applied to each node of that set.
        steps: Vec<Step>,
    },
}

/// Binary operators, by precedence from lowest to highest.
///
/// [`XPath` 1.0 § 3.4](https://www.w3.org/TR/xpath-10/#booleans)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinaryOp {
    /// `or`
    #[strum(serialize = "or")]
    Or,
    /// `and`
    #[strum(serialize = "and")]
    And,
    /// `=`
    #[strum(serialize = "=")]
    Equal,
    /// `!=`
    #[strum(serialize = "!=")]
    NotEqual,
    /// `<`
    #[strum(serialize = "<")]
    LessThan,
    /// `<=`
    #[strum(serialize = "<=")]
    LessThanOrEqual,
    /// `>`
    #[strum(serialize = ">")]
    GreaterThan,
    /// `>=`
    #[strum(serialize = ">=")]
    GreaterThanOrEqual,
    /// `+`
    #[strum(serialize = "+")]
    Add,
    /// `-`
    #[strum(serialize = "-")]
    Subtract,
    /// `*`
    #[strum(serialize = "*")]
    Multiply,
    /// `div`
    #[strum(serialize = "div")]
    Divide,
    /// `mod`
    #[strum(serialize = "mod")]
    Modulo,
}

/// A location path.
///
/// [`XPath` 1.0 § 2](https://www.w3.org/TR/xpath-10/#location-paths)
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Whether the path starts at the root node.
    pub absolute: bool,
    /// Steps, applied left to right.
    pub steps: Vec<Step>,
}

/// A single location step: `axis::node-test[predicate]*`.
///
/// [`XPath` 1.0 § 2.1](https://www.w3.org/TR/xpath-10/#section-Location-Steps)
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Direction of the step.
    pub axis: Axis,
    /// Which nodes on the axis are selected.
    pub test: NodeTest,
    /// Filters applied with positions along the axis.
    pub predicates: Vec<Expr>,
}

impl Step {
    /// `descendant-or-self::node()`, the expansion of `//`.
    #[must_use]
    pub const fn descendant_or_self() -> Self {
        Self {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

/// [`XPath` 1.0 § 2.2 Axes](https://www.w3.org/TR/xpath-10/#axes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Axis {
    /// `ancestor::`
    Ancestor,
    /// `ancestor-or-self::`
    AncestorOrSelf,
    /// `attribute::` or `@`
    Attribute,
    /// `child::`, the default axis
    Child,
    /// `descendant::`
    Descendant,
    /// `descendant-or-self::`
    DescendantOrSelf,
    /// `following::`
    Following,
    /// `following-sibling::`
    FollowingSibling,
    /// `namespace::`, always empty since namespaces are not modelled
    Namespace,
    /// `parent::` or `..`
    Parent,
    /// `preceding::`
    Preceding,
    /// `preceding-sibling::`
    PrecedingSibling,
    /// `self::` or `.`
    #[strum(serialize = "self")]
    SelfAxis,
}

impl Axis {
    /// "An axis that only ever contains the context node or nodes that are
    /// before the context node in document order is a reverse axis."
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Ancestor | Self::AncestorOrSelf | Self::Preceding | Self::PrecedingSibling
        )
    }
}

/// [`XPath` 1.0 § 2.3 Node Tests](https://www.w3.org/TR/xpath-10/#node-tests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name, matched literally against the principal node type.
    Name(String),
    /// `prefix:*`
    PrefixWildcard(String),
    /// `*`
    Wildcard,
    /// `node()`
    Node,
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `processing-instruction()`, never matches since the tree holds none
    ProcessingInstruction(Option<String>),
}
