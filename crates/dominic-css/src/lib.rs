//! CSS selector to `XPath` 1.0 translation.
//!
//! The translator is a pure function of the selector text: it tokenizes the
//! selector into a [`SelectorList`], then renders that tree as an `XPath`
//! location path. It never looks at a document.
//!
//! ```
//! assert_eq!(dominic_css::translate("#foo").unwrap(), "//*[@id='foo']");
//! assert_eq!(dominic_css::translate("div > p").unwrap(), "//div/p");
//! ```

/// Selector errors.
pub mod error;
/// Selector syntax tree and parser.
pub mod selector;
/// `XPath` rendering.
pub mod xpath;

pub use error::MalformedSelector;
pub use selector::{
    AttrOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition,
    SelectorList, parse_selector,
};
pub use xpath::quote_literal;

/// Translate a selector into an absolute `XPath` location path.
///
/// # Errors
///
/// Returns [`MalformedSelector`] if the selector uses syntax outside the
/// supported subset.
pub fn translate(selector: &str) -> Result<String, MalformedSelector> {
    let path = parse_selector(selector)?.to_xpath();
    tracing::debug!(selector, xpath = %path, "translated selector");
    Ok(path)
}

/// Translate a selector into a path relative to a context node, selecting
/// its matching descendants.
///
/// # Errors
///
/// As [`translate`].
pub fn translate_relative(selector: &str) -> Result<String, MalformedSelector> {
    let path = parse_selector(selector)?.to_relative_xpath();
    tracing::debug!(selector, xpath = %path, "translated relative selector");
    Ok(path)
}
