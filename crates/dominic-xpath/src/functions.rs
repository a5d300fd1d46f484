//! The core function library.
//!
//! [`XPath` 1.0 § 4](https://www.w3.org/TR/xpath-10/#corelib)

use std::collections::HashSet;

use dominic_dom::ElementData;

use crate::ast::Expr;
use crate::error::XPathError;
use crate::eval::{Evaluator, Focus, count};
use crate::lexer::is_xml_whitespace;
use crate::node::XPathNode;
use crate::value::{Value, string_to_number};

/// Minimum and maximum argument count, and how to describe them.
struct Signature {
    min: usize,
    max: usize,
    expected: &'static str,
}

const fn signature(min: usize, max: usize, expected: &'static str) -> Signature {
    Signature { min, max, expected }
}

fn lookup(name: &str) -> Option<Signature> {
    Some(match name {
        "last" | "position" | "true" | "false" => signature(0, 0, "0"),
        "count" | "id" | "boolean" | "not" | "lang" | "sum" | "floor" | "ceiling" | "round" => {
            signature(1, 1, "1")
        }
        "local-name" | "namespace-uri" | "name" | "string" | "string-length"
        | "normalize-space" | "number" => signature(0, 1, "0 or 1"),
        "concat" => signature(2, usize::MAX, "at least 2"),
        "starts-with" | "contains" | "substring-before" | "substring-after" => {
            signature(2, 2, "2")
        }
        "substring" => signature(2, 3, "2 or 3"),
        "translate" => signature(3, 3, "3"),
        _ => return None,
    })
}

fn check_call(name: &str, found: usize) -> Result<(), XPathError> {
    let signature = lookup(name).ok_or_else(|| XPathError::UnknownFunction(name.to_string()))?;
    if (signature.min..=signature.max).contains(&found) {
        Ok(())
    } else {
        Err(XPathError::Arity {
            function: name.to_string(),
            expected: signature.expected,
            found,
        })
    }
}

/// Check every function call in `expr` against the core library.
///
/// # Errors
///
/// Returns [`XPathError::UnknownFunction`] or [`XPathError::Arity`] for the
/// first bad call found.
pub(crate) fn validate(expr: &Expr) -> Result<(), XPathError> {
    match expr {
        Expr::Number(_) | Expr::Literal(_) | Expr::Variable(_) => Ok(()),
        Expr::Negate(operand) => validate(operand),
        Expr::Binary { left, right, .. } | Expr::Union(left, right) => {
            validate(left)?;
            validate(right)
        }
        Expr::Function { name, args } => {
            check_call(name, args.len())?;
            args.iter().try_for_each(validate)
        }
        Expr::Path(path) => path
            .steps
            .iter()
            .flat_map(|step| &step.predicates)
            .try_for_each(validate),
        Expr::Filter {
            primary,
            predicates,
        } => {
            validate(primary)?;
            predicates.iter().try_for_each(validate)
        }
        Expr::FilterPath { filter, steps } => {
            validate(filter)?;
            steps
                .iter()
                .flat_map(|step| &step.predicates)
                .try_for_each(validate)
        }
    }
}

impl Evaluator<'_> {
    pub(crate) fn call_function(
        &self,
        name: &str,
        args: &[Expr],
        focus: Focus,
    ) -> Result<Value, XPathError> {
        check_call(name, args.len())?;

        let value = match name {
            // § 4.1 Node Set Functions
            "last" => Value::Number(count(focus.size)),
            "position" => Value::Number(count(focus.position)),
            "count" => Value::Number(count(self.node_set(&args[0], focus)?.len())),
            "id" => self.id(&args[0], focus)?,
            "local-name" => {
                let name = self.name_of(args, focus)?;
                let local = name.rsplit(':').next().unwrap_or_default();
                Value::String(local.to_string())
            }
            "namespace-uri" => {
                let _ = self.name_of(args, focus)?;
                Value::String(String::new())
            }
            "name" => Value::String(self.name_of(args, focus)?),

            // § 4.2 String Functions
            "string" => Value::String(self.string_or_context(args, focus)?),
            "concat" => {
                let mut out = String::new();
                for arg in args {
                    out.push_str(&self.string(arg, focus)?);
                }
                Value::String(out)
            }
            "starts-with" => {
                let (s, prefix) = self.two_strings(args, focus)?;
                Value::Boolean(s.starts_with(&prefix))
            }
            "contains" => {
                let (s, needle) = self.two_strings(args, focus)?;
                Value::Boolean(s.contains(&needle))
            }
            "substring-before" => {
                let (s, needle) = self.two_strings(args, focus)?;
                let before = s.find(&needle).map_or("", |i| &s[..i]);
                Value::String(before.to_string())
            }
            "substring-after" => {
                let (s, needle) = self.two_strings(args, focus)?;
                let after = s.find(&needle).map_or("", |i| &s[i + needle.len()..]);
                Value::String(after.to_string())
            }
            "substring" => {
                let s = self.string(&args[0], focus)?;
                let start = round(self.number(&args[1], focus)?);
                let end = match args.get(2) {
                    Some(length) => start + round(self.number(length, focus)?),
                    None => f64::INFINITY,
                };
                Value::String(substring(&s, start, end))
            }
            "string-length" => {
                let s = self.string_or_context(args, focus)?;
                Value::Number(count(s.chars().count()))
            }
            "normalize-space" => {
                let s = self.string_or_context(args, focus)?;
                Value::String(normalize_space(&s))
            }
            "translate" => {
                let s = self.string(&args[0], focus)?;
                let from: Vec<char> = self.string(&args[1], focus)?.chars().collect();
                let to: Vec<char> = self.string(&args[2], focus)?.chars().collect();
                Value::String(translate(&s, &from, &to))
            }

            // § 4.3 Boolean Functions
            "boolean" => Value::Boolean(self.evaluate(&args[0], focus)?.to_boolean()),
            "not" => Value::Boolean(!self.evaluate(&args[0], focus)?.to_boolean()),
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            "lang" => {
                let wanted = self.string(&args[0], focus)?;
                Value::Boolean(self.lang_matches(focus.node, &wanted))
            }

            // § 4.4 Number Functions
            "number" => Value::Number(match args.first() {
                Some(arg) => self.number(arg, focus)?,
                None => string_to_number(&focus.node.string_value(self.tree)),
            }),
            "sum" => Value::Number(
                self.node_set(&args[0], focus)?
                    .iter()
                    .map(|node| string_to_number(&node.string_value(self.tree)))
                    .sum(),
            ),
            "floor" => Value::Number(self.number(&args[0], focus)?.floor()),
            "ceiling" => Value::Number(self.number(&args[0], focus)?.ceil()),
            "round" => Value::Number(round(self.number(&args[0], focus)?)),

            _ => return Err(XPathError::UnknownFunction(name.to_string())),
        };
        Ok(value)
    }

    fn string(&self, arg: &Expr, focus: Focus) -> Result<String, XPathError> {
        Ok(self.evaluate(arg, focus)?.to_string_value(self.tree))
    }

    fn number(&self, arg: &Expr, focus: Focus) -> Result<f64, XPathError> {
        Ok(self.evaluate(arg, focus)?.to_number(self.tree))
    }

    fn two_strings(&self, args: &[Expr], focus: Focus) -> Result<(String, String), XPathError> {
        Ok((self.string(&args[0], focus)?, self.string(&args[1], focus)?))
    }

    /// The string of the only argument, or of the context node without one.
    fn string_or_context(&self, args: &[Expr], focus: Focus) -> Result<String, XPathError> {
        match args.first() {
            Some(arg) => self.string(arg, focus),
            None => Ok(focus.node.string_value(self.tree)),
        }
    }

    /// The name of the first node of the argument, or of the context node.
    fn name_of(&self, args: &[Expr], focus: Focus) -> Result<String, XPathError> {
        let node = match args.first() {
            Some(arg) => self.node_set(arg, focus)?.first().copied(),
            None => Some(focus.node),
        };
        Ok(node.map(|n| n.name(self.tree).to_string()).unwrap_or_default())
    }

    /// [`XPath` 1.0 § 4.1 id()](https://www.w3.org/TR/xpath-10/#function-id)
    ///
    /// Elements in the context node's tree whose `id` attribute is one of
    /// the whitespace-separated tokens of the argument.
    fn id(&self, arg: &Expr, focus: Focus) -> Result<Value, XPathError> {
        let text = match self.evaluate(arg, focus)? {
            Value::NodeSet(nodes) => nodes
                .iter()
                .map(|node| node.string_value(self.tree))
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string_value(self.tree),
        };
        let wanted: HashSet<&str> = text
            .split(is_xml_whitespace)
            .filter(|token| !token.is_empty())
            .collect();

        let root = focus.node.root(self.tree);
        let found = std::iter::once(root)
            .chain(self.tree.descendants(root))
            .filter(|&id| {
                self.tree
                    .as_element(id)
                    .and_then(ElementData::id)
                    .is_some_and(|value| wanted.contains(value))
            })
            .map(XPathNode::Node)
            .collect();
        Ok(Value::NodeSet(found))
    }

    /// [`XPath` 1.0 § 4.3 lang()](https://www.w3.org/TR/xpath-10/#function-lang)
    ///
    /// The nearest `xml:lang` (or HTML `lang`) attribute on the context node
    /// or an ancestor decides, ignoring case and any suffix after `-`.
    fn lang_matches(&self, node: XPathNode, wanted: &str) -> bool {
        let mut current = match node {
            XPathNode::Attribute { owner, .. } => Some(owner),
            XPathNode::Node(id) => Some(id),
        };
        while let Some(id) = current {
            if let Some(data) = self.tree.as_element(id)
                && let Some(lang) = data
                    .get_attribute("xml:lang")
                    .or_else(|| data.get_attribute("lang"))
            {
                let lang = lang.to_ascii_lowercase();
                let wanted = wanted.to_ascii_lowercase();
                return lang == wanted
                    || lang
                        .strip_prefix(wanted.as_str())
                        .is_some_and(|rest| rest.starts_with('-'));
            }
            current = self.tree.parent(id);
        }
        false
    }
}

/// [`XPath` 1.0 § 4.4 round()](https://www.w3.org/TR/xpath-10/#function-round)
///
/// Rounds half toward positive infinity, keeping `-0` for `[-0.5, 0)`.
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else if (-0.5..0.0).contains(&n) {
        -0.0
    } else {
        (n + 0.5).floor()
    }
}

/// Characters whose 1-based position `p` satisfies `start <= p < end`.
fn substring(s: &str, start: f64, end: f64) -> String {
    s.chars()
        .enumerate()
        .filter(|&(index, _)| {
            let position = count(index + 1);
            position >= start && position < end
        })
        .map(|(_, c)| c)
        .collect()
}

fn normalize_space(s: &str) -> String {
    s.split(is_xml_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace each character of `from` with the one at the same position in
/// `to`, dropping it when `to` is shorter. The first occurrence in `from`
/// wins.
fn translate(s: &str, from: &[char], to: &[char]) -> String {
    s.chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(index) => to.get(index).copied(),
            None => Some(c),
        })
        .collect()
}
