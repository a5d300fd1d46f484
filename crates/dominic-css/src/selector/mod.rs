//! Selector syntax tree and parser.
//!
//! Supports the part of [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//! that maps directly onto an `XPath` location path:
//! - Type and universal selectors: `div`, `*`
//! - ID and class selectors: `#main`, `.a.b`
//! - Attribute selectors: `[href]`, `[type=text]`, `[lang|=en]`, `[src$=".png"]`
//! - Descendant and child combinators: `div p`, `ul > li`
//! - Selector lists: `h1, h2`
//!
//! Everything else (sibling combinators, pseudo-classes, namespaces) is
//! rejected with a [`MalformedSelector`].

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::MalformedSelector;

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// "A comma-separated list of selectors represents the union of all
/// elements selected by each of the individual selectors in the list."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Compound selectors in source order, with `combinators[i]` joining
/// `compounds[i]` and `compounds[i + 1]`.
///
/// Example: `div.container > ul li` is parsed as:
/// ```text
/// [div.container] --(Child)--> [ul] --(Descendant)--> [li]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The compound selectors, leftmost first.
    pub compounds: Vec<CompoundSelector>,
    /// One combinator between each adjacent pair of compounds.
    pub combinators: Vec<Combinator>,
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Type selector; `None` for `*` or when omitted.
    pub tag: Option<String>,
    /// ID, class and attribute conditions in source order.
    pub conditions: Vec<Condition>,
}

/// A condition attached to a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Example: `#header`
    Id(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Example: `.nav-item`
    Class(String),
    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Example: `[href^="https"]`
    Attribute(AttributeSelector),
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// `None` for a presence test such as `[href]`.
    pub operator: Option<AttrOperator>,
    /// The operand, unquoted. Empty for a presence test.
    pub value: String,
}

/// Attribute value operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `[att=val]`: "whose value is exactly 'val'"
    Equals,
    /// `[att^=val]`: "whose value begins with the prefix 'val'"
    Prefix,
    /// `[att$=val]`: "whose value ends with the suffix 'val'"
    Suffix,
    /// `[att*=val]`: "whose value contains at least one instance of the
    /// substring 'val'"
    Substring,
    /// `[att~=val]`: "whose value is a whitespace-separated list of words,
    /// one of which is exactly 'val'"
    Includes,
    /// `[att|=val]`: "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'"
    DashMatch,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// Whitespace: "an element B that is an arbitrary descendant of some
    /// ancestor element A".
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// `>`: "an element B that is a direct child of element A".
    Child,
}

/// Parse a selector or comma-separated selector list.
///
/// # Errors
///
/// Returns [`MalformedSelector`] for an empty selector, an unsupported
/// combinator, pseudo-class or attribute operator, an unclosed bracket or
/// quote, or a combinator with nothing on one side.
pub fn parse_selector(selector: &str) -> Result<SelectorList, MalformedSelector> {
    SelectorParser::new(selector).parse_list()
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// [`XPath` 1.0 § 3.7](https://www.w3.org/TR/xpath-10/#exprlex) `NCName`,
/// matching what the `XPath` lexer accepts.
fn is_xpath_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| {
            c.is_alphabetic() || c == '_' || c.is_ascii_digit() || matches!(c, '-' | '.' | '\u{B7}')
        })
}

struct SelectorParser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> SelectorParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> MalformedSelector {
        MalformedSelector {
            selector: self.source.to_string(),
            position,
            reason: reason.into(),
        }
    }

    /// Offset of the next character, or the end of input.
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            let _ = self.chars.next();
            skipped = true;
        }
        skipped
    }

    /// [§ 4.1](https://www.w3.org/TR/selectors-4/#grouping)
    /// `<selector-list> = <complex-selector>#`
    fn parse_list(&mut self) -> Result<SelectorList, MalformedSelector> {
        let mut selectors = Vec::new();
        loop {
            let _ = self.skip_whitespace();
            let start = self.offset();
            let complex = self.parse_complex()?;
            if complex.compounds.is_empty() {
                let at = self.offset();
                return Err(match self.peek() {
                    None if selectors.is_empty() => self.error(start, "empty selector"),
                    Some(c) if c != ',' => self.error(at, format!("unexpected {c:?}")),
                    _ => self.error(start, "empty selector in list"),
                });
            }
            selectors.push(complex);
            match self.chars.next() {
                Some((_, ',')) => {}
                None => return Ok(SelectorList(selectors)),
                Some((i, c)) => return Err(self.error(i, format!("unexpected {c:?}"))),
            }
        }
    }

    /// [§ 4.3](https://www.w3.org/TR/selectors-4/#complex)
    /// `<complex-selector> = <compound-selector> [ <combinator>? <compound-selector> ]*`
    ///
    /// Stops before a `,` or at the end of input.
    fn parse_complex(&mut self) -> Result<ComplexSelector, MalformedSelector> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<(Combinator, usize)> = None;

        loop {
            let start = self.offset();
            let Some(compound) = self.parse_compound()? else {
                break;
            };
            if !compounds.is_empty() {
                combinators.push(pending.map_or(Combinator::Descendant, |(c, _)| c));
            }
            compounds.push(compound);
            pending = None;

            let had_space = self.skip_whitespace();
            let at = self.offset();
            match self.peek() {
                Some('>') => {
                    let _ = self.chars.next();
                    let _ = self.skip_whitespace();
                    pending = Some((Combinator::Child, at));
                }
                Some(c @ ('+' | '~')) => {
                    return Err(self.error(at, format!("sibling combinator {c:?} is not supported")));
                }
                Some(',') | None => break,
                Some(_) if had_space => pending = Some((Combinator::Descendant, start)),
                Some(c) => return Err(self.error(at, format!("unexpected {c:?}"))),
            }
        }

        match pending {
            Some((Combinator::Child, at)) => Err(self.error(at, "'>' has no right-hand selector")),
            _ => Ok(ComplexSelector {
                compounds,
                combinators,
            }),
        }
    }

    /// [§ 4.2](https://www.w3.org/TR/selectors-4/#compound)
    /// `<compound-selector> = [ <type-selector>? <subclass-selector>* ]!`
    ///
    /// Returns `None` when no selector starts here.
    fn parse_compound(&mut self) -> Result<Option<CompoundSelector>, MalformedSelector> {
        let mut compound = CompoundSelector::default();
        let mut seen_any = false;

        let start = self.offset();
        match self.peek() {
            Some('*') => {
                let _ = self.chars.next();
                seen_any = true;
            }
            Some(c) if is_ident_start_char(c) || c == '-' || c == '\\' => {
                let tag = self.consume_ident()?;
                compound.tag = Some(self.xpath_name(start, tag)?);
                seen_any = true;
            }
            Some('>') => return Err(self.error(start, "'>' has no left-hand selector")),
            _ => {}
        }

        loop {
            let at = self.offset();
            match self.peek() {
                Some('#') => {
                    let _ = self.chars.next();
                    let id = self.consume_name(at, "'#'")?;
                    compound.conditions.push(Condition::Id(id));
                }
                Some('.') => {
                    let _ = self.chars.next();
                    let class = self.consume_name(at, "'.'")?;
                    compound.conditions.push(Condition::Class(class));
                }
                Some('[') => {
                    let _ = self.chars.next();
                    let attribute = self.parse_attribute(at)?;
                    compound.conditions.push(Condition::Attribute(attribute));
                }
                Some(':') => {
                    return Err(self.error(at, "pseudo-classes are not supported"));
                }
                Some(']') => return Err(self.error(at, "unmatched ']'")),
                Some('*') => {
                    return Err(self.error(at, "'*' must come first in a compound selector"));
                }
                Some('|') => return Err(self.error(at, "namespaces are not supported")),
                Some(c) if is_ident_char(c) && seen_any => {
                    return Err(self.error(at, "type selector must come first"));
                }
                _ => break,
            }
            seen_any = true;
        }

        Ok(seen_any.then_some(compound))
    }

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// `'[' name ( op value )? ']'`, after the `[` has been consumed.
    fn parse_attribute(&mut self, open: usize) -> Result<AttributeSelector, MalformedSelector> {
        let _ = self.skip_whitespace();
        let name_at = self.offset();
        match self.peek() {
            Some(c) if is_ident_char(c) || c == '\\' => {}
            None => return Err(self.error(open, "unclosed '['")),
            Some(_) => return Err(self.error(name_at, "expected an attribute name")),
        }
        let name = self.consume_ident()?;
        let name = self.xpath_name(name_at, name)?;
        let _ = self.skip_whitespace();

        let op_at = self.offset();
        let operator = match self.chars.next() {
            Some((_, ']')) => {
                return Ok(AttributeSelector {
                    name,
                    operator: None,
                    value: String::new(),
                });
            }
            Some((_, '=')) => AttrOperator::Equals,
            Some((_, c @ ('^' | '$' | '*' | '~' | '|'))) => {
                if self.peek() != Some('=') {
                    return Err(self.error(op_at, format!("unsupported attribute operator {c:?}")));
                }
                let _ = self.chars.next();
                match c {
                    '^' => AttrOperator::Prefix,
                    '$' => AttrOperator::Suffix,
                    '*' => AttrOperator::Substring,
                    '~' => AttrOperator::Includes,
                    _ => AttrOperator::DashMatch,
                }
            }
            Some((_, c)) => {
                return Err(self.error(op_at, format!("unsupported attribute operator {c:?}")));
            }
            None => return Err(self.error(open, "unclosed '['")),
        };

        let _ = self.skip_whitespace();
        let value_at = self.offset();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.consume_string(quote)?,
            Some(']') | None => return Err(self.error(value_at, "expected an attribute value")),
            Some(_) => self.consume_unquoted_value(),
        };
        let _ = self.skip_whitespace();

        match self.chars.next() {
            Some((_, ']')) => Ok(AttributeSelector {
                name,
                operator: Some(operator),
                value,
            }),
            Some((i, c)) => Err(self.error(i, format!("expected ']', found {c:?}"))),
            None => Err(self.error(open, "unclosed '['")),
        }
    }

    /// Tag and attribute names are pasted into the path as name tests, so
    /// after escapes are decoded they must still be `XPath` names.
    fn xpath_name(&self, at: usize, name: String) -> Result<String, MalformedSelector> {
        if is_xpath_name(&name) {
            Ok(name)
        } else {
            Err(self.error(at, format!("{name:?} is not a valid XPath name")))
        }
    }

    /// The name after `#` or `.`; digits may lead.
    fn consume_name(&mut self, at: usize, after: &str) -> Result<String, MalformedSelector> {
        match self.peek() {
            Some(c) if is_ident_char(c) || c == '\\' => self.consume_ident(),
            _ => Err(self.error(at, format!("expected a name after {after}"))),
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident(&mut self) -> Result<String, MalformedSelector> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                ident.push(self.consume_escape()?);
            } else if is_ident_char(c) {
                ident.push(c);
                let _ = self.chars.next();
            } else {
                break;
            }
        }
        Ok(ident)
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Up to six hex digits and one optional whitespace character, or any
    /// single other character taken literally.
    fn consume_escape(&mut self) -> Result<char, MalformedSelector> {
        let Some((at, _)) = self.chars.next() else {
            return Ok(char::REPLACEMENT_CHARACTER);
        };
        let mut hex = String::new();
        while hex.len() < 6
            && let Some(c) = self.peek().filter(char::is_ascii_hexdigit)
        {
            hex.push(c);
            let _ = self.chars.next();
        }
        if hex.is_empty() {
            return self
                .chars
                .next()
                .map(|(_, c)| c)
                .ok_or_else(|| self.error(at, "escape at end of selector"));
        }
        if self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            let _ = self.chars.next();
        }
        Ok(u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|&code| code != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string(&mut self, quote: char) -> Result<String, MalformedSelector> {
        let open = self.offset();
        let _ = self.chars.next();
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    let _ = self.chars.next();
                    return Ok(value);
                }
                Some('\\') => value.push(self.consume_escape()?),
                Some(c) => {
                    value.push(c);
                    let _ = self.chars.next();
                }
                None => return Err(self.error(open, "unterminated string")),
            }
        }
    }

    /// An unquoted value runs to whitespace or `]`.
    fn consume_unquoted_value(&mut self) -> String {
        let mut value = String::new();
        while let Some(c) = self
            .peek()
            .filter(|&c| !c.is_ascii_whitespace() && c != ']' && c != '"' && c != '\'')
        {
            value.push(c);
            let _ = self.chars.next();
        }
        value
    }
}
