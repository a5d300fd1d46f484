//! Query and edit markup with CSS selectors.
//!
//! # Scope
//!
//! - **[`Dom`]**: parses markup once and owns the tree
//! - **[`Element`]**: reads and writes one element's attributes, text and
//!   markup in place
//! - **[`ResultSet`]**: the elements a query matched, in document order
//!
//! Every query translates its selector to `XPath` with [`css::translate`]
//! and evaluates it against the current tree, so mutations are visible to
//! the next query.
//!
//! ```
//! use dominic::Dom;
//!
//! let dom = Dom::new(
//!     r#"<ul id="objects"><li class="geometry">a</li><li>b</li><li class="geometry">c</li></ul>"#,
//! )?;
//! let items = dom.find("ul#objects > li.geometry")?;
//! assert_eq!(items.len(), 2);
//! assert_eq!(items.last().map(dominic::Element::text).as_deref(), Some("c"));
//! # Ok::<(), dominic::DomError>(())
//! ```
//!
//! # Not Implemented
//!
//! - Sibling combinators and pseudo-classes in selectors
//! - Sharing a document across threads

mod dom;
mod element;
/// Facade errors.
pub mod error;
mod result_set;

pub use dom::Dom;
pub use element::Element;
pub use error::{DomError, Result};
pub use result_set::ResultSet;

pub use dominic_css as css;
pub use dominic_dom as tree;
pub use dominic_markup as markup;
pub use dominic_xpath as xpath;
