//! Recursive-descent parser producing an [`Expr`].
//!
//! Each method parses one production of the `XPath` 1.0 grammar, from the
//! lowest-precedence `OrExpr` down to `PrimaryExpr`.

use crate::ast::{Axis, BinaryOp, Expr, LocationPath, NodeTest, Step};
use crate::error::XPathError;
use crate::lexer::{Token, tokenize};

/// Parse an expression.
///
/// # Errors
///
/// Returns [`XPathError::Parse`] if `source` is not a complete `XPath` 1.0
/// expression.
pub fn parse(source: &str) -> Result<Expr, XPathError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.chars().count(),
    };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error(format!("unexpected {token} after expression")));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    /// Offset reported for errors at end of input.
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), XPathError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected}, found {}", self.describe_current())))
        }
    }

    fn describe_current(&self) -> String {
        self.peek()
            .map_or_else(|| "end of expression".to_string(), ToString::to_string)
    }

    fn error(&self, message: impl Into<String>) -> XPathError {
        let position = self.tokens.get(self.pos).map_or(self.end, |(_, p)| *p);
        XPathError::parse(position, message)
    }

    /// ```text
    /// OrExpr ::= AndExpr | OrExpr 'or' AndExpr
    /// ```
    fn parse_or(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    /// ```text
    /// AndExpr ::= EqualityExpr | AndExpr 'and' EqualityExpr
    /// ```
    fn parse_and(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_equality()?;
        while self.eat(&Token::And) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    /// ```text
    /// EqualityExpr ::= RelationalExpr
    ///                | EqualityExpr '=' RelationalExpr
    ///                | EqualityExpr '!=' RelationalExpr
    /// ```
    fn parse_equality(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Equal) => BinaryOp::Equal,
                Some(Token::NotEqual) => BinaryOp::NotEqual,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
    }

    /// ```text
    /// RelationalExpr ::= AdditiveExpr
    ///                  | RelationalExpr ('<' | '>' | '<=' | '>=') AdditiveExpr
    /// ```
    fn parse_relational(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::LessThan) => BinaryOp::LessThan,
                Some(Token::LessThanOrEqual) => BinaryOp::LessThanOrEqual,
                Some(Token::GreaterThan) => BinaryOp::GreaterThan,
                Some(Token::GreaterThanOrEqual) => BinaryOp::GreaterThanOrEqual,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    /// ```text
    /// AdditiveExpr ::= MultiplicativeExpr
    ///                | AdditiveExpr ('+' | '-') MultiplicativeExpr
    /// ```
    fn parse_additive(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    /// ```text
    /// MultiplicativeExpr ::= UnaryExpr
    ///                      | MultiplicativeExpr ('*' | 'div' | 'mod') UnaryExpr
    /// ```
    fn parse_multiplicative(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Multiply) => BinaryOp::Multiply,
                Some(Token::Div) => BinaryOp::Divide,
                Some(Token::Mod) => BinaryOp::Modulo,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    /// ```text
    /// UnaryExpr ::= UnionExpr | '-' UnaryExpr
    /// ```
    fn parse_unary(&mut self) -> Result<Expr, XPathError> {
        if self.eat(&Token::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.parse_union()
    }

    /// ```text
    /// UnionExpr ::= PathExpr | UnionExpr '|' PathExpr
    /// ```
    fn parse_union(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_path_expr()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// ```text
    /// PathExpr ::= LocationPath
    ///            | FilterExpr
    ///            | FilterExpr '/' RelativeLocationPath
    ///            | FilterExpr '//' RelativeLocationPath
    /// ```
    fn parse_path_expr(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                let steps = if self.at_step_start() {
                    self.parse_relative_path()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![Step::descendant_or_self()];
                steps.extend(self.parse_relative_path()?);
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            _ if self.at_step_start() => Ok(Expr::Path(LocationPath {
                absolute: false,
                steps: self.parse_relative_path()?,
            })),
            _ => {
                let filter = self.parse_filter_expr()?;
                let mut steps = Vec::new();
                if self.eat(&Token::Slash) {
                    steps = self.parse_relative_path()?;
                } else if self.eat(&Token::DoubleSlash) {
                    steps.push(Step::descendant_or_self());
                    steps.extend(self.parse_relative_path()?);
                }
                if steps.is_empty() {
                    Ok(filter)
                } else {
                    Ok(Expr::FilterPath {
                        filter: Box::new(filter),
                        steps,
                    })
                }
            }
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Dot
                    | Token::DotDot
                    | Token::At
                    | Token::AxisName(_)
                    | Token::NodeType(_)
                    | Token::NameTest(_)
            )
        )
    }

    /// ```text
    /// RelativeLocationPath ::= Step
    ///                        | RelativeLocationPath '/' Step
    ///                        | RelativeLocationPath '//' Step
    /// ```
    fn parse_relative_path(&mut self) -> Result<Vec<Step>, XPathError> {
        let mut steps = vec![self.parse_step()?];
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                steps.push(self.parse_step()?);
            } else {
                return Ok(steps);
            }
        }
    }

    /// ```text
    /// Step ::= AxisSpecifier NodeTest Predicate* | '.' | '..'
    /// AxisSpecifier ::= AxisName '::' | '@'?
    /// ```
    fn parse_step(&mut self) -> Result<Step, XPathError> {
        let axis = match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                return Ok(abbreviated(Axis::SelfAxis));
            }
            Some(Token::DotDot) => {
                self.pos += 1;
                return Ok(abbreviated(Axis::Parent));
            }
            Some(Token::At) => {
                self.pos += 1;
                Axis::Attribute
            }
            Some(&Token::AxisName(axis)) => {
                self.pos += 1;
                self.expect(&Token::ColonColon)?;
                axis
            }
            _ => Axis::Child,
        };

        let test = self.parse_node_test()?;
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket)?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    /// ```text
    /// NodeTest ::= NameTest
    ///            | NodeType '(' ')'
    ///            | 'processing-instruction' '(' Literal ')'
    /// ```
    fn parse_node_test(&mut self) -> Result<NodeTest, XPathError> {
        match self.peek().cloned() {
            Some(Token::NameTest(name)) => {
                self.pos += 1;
                Ok(if name == "*" {
                    NodeTest::Wildcard
                } else if let Some(prefix) = name.strip_suffix(":*") {
                    NodeTest::PrefixWildcard(prefix.to_string())
                } else {
                    NodeTest::Name(name)
                })
            }
            Some(Token::NodeType(kind)) => {
                self.pos += 1;
                self.expect(&Token::LeftParen)?;
                let test = match kind.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => {
                        let target = match self.peek() {
                            Some(Token::Literal(target)) => Some(target.clone()),
                            _ => None,
                        };
                        if target.is_some() {
                            self.pos += 1;
                        }
                        NodeTest::ProcessingInstruction(target)
                    }
                };
                self.expect(&Token::RightParen)?;
                Ok(test)
            }
            _ => Err(self.error(format!(
                "expected a node test, found {}",
                self.describe_current()
            ))),
        }
    }

    /// ```text
    /// FilterExpr ::= PrimaryExpr | FilterExpr Predicate
    /// ```
    fn parse_filter_expr(&mut self) -> Result<Expr, XPathError> {
        let primary = self.parse_primary()?;
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket)?;
        }
        if predicates.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Filter {
                primary: Box::new(primary),
                predicates,
            })
        }
    }

    /// ```text
    /// PrimaryExpr ::= VariableReference
    ///               | '(' Expr ')'
    ///               | Literal
    ///               | Number
    ///               | FunctionCall
    /// ```
    fn parse_primary(&mut self) -> Result<Expr, XPathError> {
        let found = self.describe_current();
        match self.advance() {
            Some(Token::Variable(name)) => Ok(Expr::Variable(name)),
            Some(Token::Literal(value)) => Ok(Expr::Literal(value)),
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LeftParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            Some(Token::FunctionName(name)) => self.parse_function_call(name),
            Some(_) => {
                self.pos -= 1;
                Err(self.error(format!("expected an expression, found {found}")))
            }
            None => Err(self.error("unexpected end of expression")),
        }
    }

    /// ```text
    /// FunctionCall ::= FunctionName '(' ( Argument ( ',' Argument )* )? ')'
    /// ```
    fn parse_function_call(&mut self, name: String) -> Result<Expr, XPathError> {
        self.expect(&Token::LeftParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RightParen) {
            loop {
                args.push(self.parse_or()?);
                if self.eat(&Token::RightParen) {
                    break;
                }
                self.expect(&Token::Comma)?;
            }
        }
        Ok(Expr::Function { name, args })
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

const fn abbreviated(axis: Axis) -> Step {
    Step {
        axis,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_step(axis: Axis, name: &str) -> Step {
        Step {
            axis,
            test: NodeTest::Name(name.to_string()),
            predicates: Vec::new(),
        }
    }

    #[test]
    fn abbreviated_steps_expand() {
        let expr = parse("//para/@type").unwrap();
        assert_eq!(
            expr,
            Expr::Path(LocationPath {
                absolute: true,
                steps: vec![
                    Step::descendant_or_self(),
                    name_step(Axis::Child, "para"),
                    name_step(Axis::Attribute, "type"),
                ],
            })
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * 3").unwrap();
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn filter_followed_by_path() {
        let expr = parse("$nodes[1]//b").unwrap();
        let Expr::FilterPath { filter, steps } = expr else {
            panic!("expected a filter path");
        };
        assert!(matches!(*filter, Expr::Filter { .. }));
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn lone_slash_selects_root() {
        assert_eq!(
            parse("/").unwrap(),
            Expr::Path(LocationPath {
                absolute: true,
                steps: Vec::new(),
            })
        );
    }

    #[test]
    fn errors_report_offsets() {
        assert!(matches!(
            parse("para["),
            Err(XPathError::Parse { position: 5, .. })
        ));
        assert!(matches!(
            parse("a b"),
            Err(XPathError::Parse { position: 2, .. })
        ));
        assert!(parse("").is_err());
        assert!(parse("count(1,)").is_err());
    }
}
