//! Facade errors.

use dominic_css::MalformedSelector;
use dominic_xpath::XPathError;

/// An error from a [`Dom`](crate::Dom) or [`Element`](crate::Element)
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The selector uses syntax the translator does not support.
    #[error(transparent)]
    MalformedSelector(#[from] MalformedSelector),

    /// The markup produced no element at all.
    #[error("markup could not be parsed: {0}")]
    Parse(String),

    /// `get` found no match.
    #[error("no element matches {selector:?}")]
    NotFound {
        /// The selector or expression that matched nothing.
        selector: String,
    },

    /// Compiling or evaluating an `XPath` expression failed.
    #[error(transparent)]
    XPath(#[from] XPathError),
}

/// Result alias for facade operations.
pub type Result<T> = std::result::Result<T, DomError>;
