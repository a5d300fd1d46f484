//! Expression tokenizer.
//!
//! [`XPath` 1.0 § 3.7 Lexical Structure](https://www.w3.org/TR/xpath-10/#exprlex)

use std::fmt;

use crate::ast::Axis;
use crate::error::XPathError;

/// An expression token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `@`
    At,
    /// `,`
    Comma,
    /// `::`
    ColonColon,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `|`
    Pipe,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `*` in operator position.
    Multiply,
    /// `and`
    And,
    /// `or`
    Or,
    /// `div`
    Div,
    /// `mod`
    Mod,
    /// An axis name followed by `::`.
    AxisName(Axis),
    /// `node`, `text`, `comment` or `processing-instruction` followed by `(`.
    NodeType(String),
    /// Any other name followed by `(`.
    FunctionName(String),
    /// A name test: `*`, `prefix:*` or a (possibly prefixed) name.
    NameTest(String),
    /// A quoted string.
    Literal(String),
    /// A number.
    Number(f64),
    /// `$name`
    Variable(String),
}

impl Token {
    /// "If there is a preceding token and the preceding token is not one of
    /// `@`, `::`, `(`, `[`, `,` or an Operator, then a `*` must be recognized
    /// as a `MultiplyOperator` and an `NCName` must be recognized as an
    /// `OperatorName`."
    const fn ends_operand(&self) -> bool {
        !matches!(
            self,
            Self::At
                | Self::ColonColon
                | Self::LeftParen
                | Self::LeftBracket
                | Self::Comma
                | Self::And
                | Self::Or
                | Self::Div
                | Self::Mod
                | Self::Multiply
                | Self::Slash
                | Self::DoubleSlash
                | Self::Pipe
                | Self::Plus
                | Self::Minus
                | Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftParen => f.write_str("'('"),
            Self::RightParen => f.write_str("')'"),
            Self::LeftBracket => f.write_str("'['"),
            Self::RightBracket => f.write_str("']'"),
            Self::Dot => f.write_str("'.'"),
            Self::DotDot => f.write_str("'..'"),
            Self::At => f.write_str("'@'"),
            Self::Comma => f.write_str("','"),
            Self::ColonColon => f.write_str("'::'"),
            Self::Slash => f.write_str("'/'"),
            Self::DoubleSlash => f.write_str("'//'"),
            Self::Pipe => f.write_str("'|'"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Equal => f.write_str("'='"),
            Self::NotEqual => f.write_str("'!='"),
            Self::LessThan => f.write_str("'<'"),
            Self::LessThanOrEqual => f.write_str("'<='"),
            Self::GreaterThan => f.write_str("'>'"),
            Self::GreaterThanOrEqual => f.write_str("'>='"),
            Self::Multiply => f.write_str("'*'"),
            Self::And => f.write_str("'and'"),
            Self::Or => f.write_str("'or'"),
            Self::Div => f.write_str("'div'"),
            Self::Mod => f.write_str("'mod'"),
            Self::AxisName(axis) => write!(f, "axis '{axis}'"),
            Self::NodeType(name) => write!(f, "node type '{name}'"),
            Self::FunctionName(name) => write!(f, "function '{name}'"),
            Self::NameTest(name) => write!(f, "name '{name}'"),
            Self::Literal(value) => write!(f, "literal {value:?}"),
            Self::Number(value) => write!(f, "number {value}"),
            Self::Variable(name) => write!(f, "variable ${name}"),
        }
    }
}

/// Splits an expression into tokens, each paired with its character offset.
///
/// # Errors
///
/// Returns [`XPathError::Parse`] on a character that starts no token, an
/// unterminated literal, or a malformed name.
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, XPathError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens: Vec<(Token, usize)> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        if is_xml_whitespace(c) {
            pos += 1;
            continue;
        }
        let start = pos;
        let operator_position = tokens.last().is_some_and(|(t, _)| t.ends_operand());

        let token = match c {
            '(' => single(&mut pos, Token::LeftParen),
            ')' => single(&mut pos, Token::RightParen),
            '[' => single(&mut pos, Token::LeftBracket),
            ']' => single(&mut pos, Token::RightBracket),
            '@' => single(&mut pos, Token::At),
            ',' => single(&mut pos, Token::Comma),
            '|' => single(&mut pos, Token::Pipe),
            '+' => single(&mut pos, Token::Plus),
            '-' => single(&mut pos, Token::Minus),
            '=' => single(&mut pos, Token::Equal),
            '/' if chars.get(pos + 1) == Some(&'/') => double(&mut pos, Token::DoubleSlash),
            '/' => single(&mut pos, Token::Slash),
            ':' if chars.get(pos + 1) == Some(&':') => double(&mut pos, Token::ColonColon),
            '!' if chars.get(pos + 1) == Some(&'=') => double(&mut pos, Token::NotEqual),
            '<' if chars.get(pos + 1) == Some(&'=') => double(&mut pos, Token::LessThanOrEqual),
            '<' => single(&mut pos, Token::LessThan),
            '>' if chars.get(pos + 1) == Some(&'=') => double(&mut pos, Token::GreaterThanOrEqual),
            '>' => single(&mut pos, Token::GreaterThan),
            '.' if chars.get(pos + 1) == Some(&'.') => double(&mut pos, Token::DotDot),
            '.' if chars.get(pos + 1).is_some_and(char::is_ascii_digit) => {
                Token::Number(read_number(&chars, &mut pos))
            }
            '.' => single(&mut pos, Token::Dot),
            '0'..='9' => Token::Number(read_number(&chars, &mut pos)),
            '"' | '\'' => Token::Literal(read_literal(&chars, &mut pos)?),
            '$' => {
                pos += 1;
                let name = read_qname(&chars, &mut pos)
                    .ok_or_else(|| XPathError::parse(start, "expected a variable name after '$'"))?;
                Token::Variable(name)
            }
            '*' if operator_position => single(&mut pos, Token::Multiply),
            '*' => single(&mut pos, Token::NameTest("*".to_string())),
            c if is_name_start_char(c) => {
                let name = read_qname(&chars, &mut pos)
                    .ok_or_else(|| XPathError::parse(start, "malformed name"))?;
                classify_name(name, &chars, pos, operator_position)
            }
            other => {
                return Err(XPathError::parse(
                    start,
                    format!("unexpected character {other:?}"),
                ));
            }
        };
        tokens.push((token, start));
    }

    Ok(tokens)
}

fn single(pos: &mut usize, token: Token) -> Token {
    *pos += 1;
    token
}

fn double(pos: &mut usize, token: Token) -> Token {
    *pos += 2;
    token
}

/// Decide what a bare name means from the token before it and the
/// characters after it.
fn classify_name(name: String, chars: &[char], pos: usize, operator_position: bool) -> Token {
    if operator_position {
        match name.as_str() {
            "and" => return Token::And,
            "or" => return Token::Or,
            "div" => return Token::Div,
            "mod" => return Token::Mod,
            _ => {}
        }
    }

    let mut next = pos;
    while chars.get(next).copied().is_some_and(is_xml_whitespace) {
        next += 1;
    }

    if chars.get(next) == Some(&'(') && !name.ends_with(":*") {
        return match name.as_str() {
            "node" | "text" | "comment" | "processing-instruction" => Token::NodeType(name),
            _ => Token::FunctionName(name),
        };
    }

    if chars.get(next) == Some(&':')
        && chars.get(next + 1) == Some(&':')
        && let Ok(axis) = name.parse::<Axis>()
    {
        return Token::AxisName(axis);
    }

    Token::NameTest(name)
}

/// `Number ::= Digits ('.' Digits?)? | '.' Digits`
fn read_number(chars: &[char], pos: &mut usize) -> f64 {
    let start = *pos;
    while chars.get(*pos).is_some_and(char::is_ascii_digit) {
        *pos += 1;
    }
    if chars.get(*pos) == Some(&'.') {
        *pos += 1;
        while chars.get(*pos).is_some_and(char::is_ascii_digit) {
            *pos += 1;
        }
    }
    let text: String = chars[start..*pos].iter().collect();
    text.parse().unwrap_or(f64::NAN)
}

/// `Literal ::= '"' [^"]* '"' | "'" [^']* "'"`
fn read_literal(chars: &[char], pos: &mut usize) -> Result<String, XPathError> {
    let start = *pos;
    let quote = chars[start];
    let Some(len) = chars[start + 1..].iter().position(|&c| c == quote) else {
        return Err(XPathError::parse(start, "unterminated string literal"));
    };
    let value = chars[start + 1..start + 1 + len].iter().collect();
    *pos = start + len + 2;
    Ok(value)
}

/// Reads `NCName (':' (NCName | '*'))?`, leaving `::` alone.
fn read_qname(chars: &[char], pos: &mut usize) -> Option<String> {
    let mut name = read_ncname(chars, pos)?;
    if chars.get(*pos) == Some(&':') && chars.get(*pos + 1) != Some(&':') {
        let mut after = *pos + 1;
        if chars.get(after) == Some(&'*') {
            name.push_str(":*");
            *pos = after + 1;
        } else {
            let local = read_ncname(chars, &mut after)?;
            name.push(':');
            name.push_str(&local);
            *pos = after;
        }
    }
    Some(name)
}

fn read_ncname(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    if !chars.get(start).copied().is_some_and(is_name_start_char) {
        return None;
    }
    *pos += 1;
    while chars.get(*pos).copied().is_some_and(is_name_char) {
        *pos += 1;
    }
    Some(chars[start..*pos].iter().collect())
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || matches!(c, '-' | '.' | '\u{B7}')
}

/// `S ::= (#x20 | #x9 | #xD | #xA)+`
pub(crate) const fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn star_after_operand_is_multiply() {
        assert_eq!(
            kinds("2 * *"),
            vec![
                Token::Number(2.0),
                Token::Multiply,
                Token::NameTest("*".to_string())
            ]
        );
    }

    #[test]
    fn operator_names_depend_on_position() {
        assert_eq!(
            kinds("and and and"),
            vec![
                Token::NameTest("and".to_string()),
                Token::And,
                Token::NameTest("and".to_string())
            ]
        );
    }

    #[test]
    fn names_before_paren_and_double_colon() {
        assert_eq!(
            kinds("child::text()"),
            vec![
                Token::AxisName(Axis::Child),
                Token::ColonColon,
                Token::NodeType("text".to_string()),
                Token::LeftParen,
                Token::RightParen
            ]
        );
        assert_eq!(
            kinds("count (x)")[0],
            Token::FunctionName("count".to_string())
        );
    }

    #[test]
    fn numbers_and_dots() {
        assert_eq!(
            kinds(".5 . .. 3."),
            vec![Token::Number(0.5), Token::Dot, Token::DotDot, Token::Number(3.0)]
        );
    }

    #[test]
    fn unterminated_literal_is_an_error() {
        assert!(matches!(
            tokenize("'abc"),
            Err(XPathError::Parse { position: 0, .. })
        ));
    }
}
