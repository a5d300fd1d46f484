//! Rendering selectors as `XPath` 1.0 location paths.
//!
//! Each compound selector becomes one step. The first step and every
//! descendant combinator use `//`, a child combinator uses `/`, and a
//! missing type selector becomes `*`. All conditions of a compound go into a
//! single predicate joined with `and`, in source order.

use std::fmt::Write as _;

use crate::selector::{
    AttrOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition,
    SelectorList,
};

impl SelectorList {
    /// Render as an absolute path from the root, e.g. `//ul/li`.
    ///
    /// A list renders as the union of its selectors.
    #[must_use]
    pub fn to_xpath(&self) -> String {
        self.render("")
    }

    /// Render relative to a context node, e.g. `.//ul/li`, matching only
    /// its descendants.
    #[must_use]
    pub fn to_relative_xpath(&self) -> String {
        self.render(".")
    }

    fn render(&self, prefix: &str) -> String {
        self.0
            .iter()
            .map(|complex| complex.render(prefix))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl ComplexSelector {
    fn render(&self, prefix: &str) -> String {
        let mut out = String::from(prefix);
        for (index, compound) in self.compounds.iter().enumerate() {
            let separator = match index.checked_sub(1).and_then(|i| self.combinators.get(i)) {
                Some(Combinator::Child) => "/",
                Some(Combinator::Descendant) | None => "//",
            };
            out.push_str(separator);
            compound.render_into(&mut out);
        }
        out
    }
}

impl CompoundSelector {
    fn render_into(&self, out: &mut String) {
        out.push_str(self.tag.as_deref().unwrap_or("*"));
        if self.conditions.is_empty() {
            return;
        }

        let several = self.conditions.len() > 1;
        let predicates: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| {
                let predicate = condition.predicate();
                // `or` binds looser than the `and` joining the conditions.
                if several && condition.is_disjunction() {
                    format!("({predicate})")
                } else {
                    predicate
                }
            })
            .collect();
        out.push('[');
        out.push_str(&predicates.join(" and "));
        out.push(']');
    }
}

impl Condition {
    /// The `XPath` boolean expression for this condition, without brackets.
    #[must_use]
    pub fn predicate(&self) -> String {
        match self {
            Self::Id(id) => format!("@id={}", quote_literal(id)),
            Self::Class(class) => includes_word("class", class),
            Self::Attribute(attribute) => attribute.predicate(),
        }
    }

    const fn is_disjunction(&self) -> bool {
        matches!(
            self,
            Self::Attribute(AttributeSelector {
                operator: Some(AttrOperator::DashMatch),
                ..
            })
        )
    }
}

impl AttributeSelector {
    /// The `XPath` boolean expression for this attribute test.
    #[must_use]
    pub fn predicate(&self) -> String {
        let name = &self.name;
        let value = quote_literal(&self.value);
        let Some(operator) = self.operator else {
            return format!("@{name}");
        };

        // An empty value never matches these operators, even on a missing
        // attribute whose string-value is also empty.
        if self.value.is_empty()
            && matches!(
                operator,
                AttrOperator::Prefix | AttrOperator::Suffix | AttrOperator::Substring
            )
        {
            return NEVER.to_string();
        }

        match operator {
            AttrOperator::Equals => format!("@{name}={value}"),
            AttrOperator::Prefix => format!("starts-with(@{name},{value})"),
            AttrOperator::Substring => format!("contains(@{name},{value})"),
            // XPath 1.0 has no ends-with().
            AttrOperator::Suffix => format!(
                "substring(@{name}, string-length(@{name}) - string-length({value}) + 1) = {value}"
            ),
            AttrOperator::Includes => includes_word(name, &self.value),
            AttrOperator::DashMatch => {
                format!("@{name}={value} or starts-with(@{name}, concat({value},'-'))")
            }
        }
    }
}

const NEVER: &str = "false()";

/// Whether the whitespace-separated word list in `@name` contains `word`.
///
/// An empty word or one holding whitespace is never a member of the list.
fn includes_word(name: &str, word: &str) -> String {
    if word.is_empty() || word.chars().any(|c| c.is_ascii_whitespace()) {
        return NEVER.to_string();
    }
    format!(
        "contains(concat(' ', normalize-space(@{name}), ' '), concat(' ', {}, ' '))",
        quote_literal(word)
    )
}

/// Quote `value` as an `XPath` string literal.
///
/// `XPath` 1.0 literals have no escapes, so a value holding both quote
/// characters is split into pieces joined with `concat()`.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let mut out = String::from("concat(");
    for (index, piece) in value.split('\'').enumerate() {
        if index > 0 {
            out.push_str(", \"'\", ");
        }
        let _ = write!(out, "'{piece}'");
    }
    out.push(')');
    out
}
