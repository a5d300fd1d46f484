//! The document facade.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use dominic_dom::{DomTree, NodeId};
use dominic_markup::{ParseIssue, ParseOptions, ParseOutput, parse_document};
use dominic_xpath::{XPath, XPathContext};

use crate::element::Element;
use crate::error::{DomError, Result};
use crate::result_set::ResultSet;

/// State shared by a [`Dom`] and every [`Element`] taken from it.
pub(crate) struct Shared {
    pub tree: RefCell<DomTree>,
    pub options: ParseOptions,
}

/// Evaluate `path` from `context` and wrap the matched elements.
pub(crate) fn select(shared: &Rc<Shared>, path: &str, context: NodeId) -> Result<ResultSet> {
    let xpath = XPath::compile(path)?;
    let nodes = {
        let tree = shared.tree.borrow();
        xpath.select_elements(&tree, context, &XPathContext::new())?
    };
    tracing::debug!(xpath = path, matches = nodes.len(), "query");
    Ok(nodes
        .into_iter()
        .map(|id| Element::new(Rc::clone(shared), id))
        .collect())
}

/// A parsed document, queried with CSS selectors.
///
/// The document owns its tree for its whole lifetime; mutations through
/// [`Element`]s change it in place and every later query sees them.
///
/// ```
/// use dominic::Dom;
///
/// let dom = Dom::new(r#"<div class="drinks"><h1 id="header">X</h1></div>"#)?;
/// let header = dom.get("div.drinks h1")?;
/// header.set_text("Y");
/// assert_eq!(dom.get("div")?.html(), r#"<div class="drinks"><h1 id="header">Y</h1></div>"#);
/// # Ok::<(), dominic::DomError>(())
/// ```
pub struct Dom {
    shared: Rc<Shared>,
    issues: Vec<ParseIssue>,
}

impl Dom {
    /// Parse `markup` with the default [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Parse`] if the markup holds no element. Any other
    /// malformation is recovered and reported by [`Dom::issues`].
    pub fn new(markup: &str) -> Result<Self> {
        Self::with_options(markup, ParseOptions::default())
    }

    /// Parse `markup` with the given options. Fragments parsed later by
    /// [`Element::set_html`] use the same options.
    ///
    /// # Errors
    ///
    /// As [`Dom::new`].
    pub fn with_options(markup: &str, options: ParseOptions) -> Result<Self> {
        let ParseOutput { tree, issues } = parse_document(markup, &options);
        if tree.document_element().is_none() {
            let reason = if markup.trim().is_empty() {
                "markup is empty"
            } else {
                "markup contains no element"
            };
            return Err(DomError::Parse(reason.to_string()));
        }
        tracing::debug!(nodes = tree.len(), issues = issues.len(), "parsed document");
        Ok(Self {
            shared: Rc::new(Shared {
                tree: RefCell::new(tree),
                options,
            }),
            issues,
        })
    }

    /// Every element matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::MalformedSelector`] for unsupported selector
    /// syntax. No match is an empty set, not an error.
    pub fn find(&self, selector: &str) -> Result<ResultSet> {
        let path = dominic_css::translate(selector)?;
        select(&self.shared, &path, NodeId::ROOT)
    }

    /// The first element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotFound`] when nothing matches, and
    /// [`DomError::MalformedSelector`] as [`Dom::find`].
    pub fn get(&self, selector: &str) -> Result<Element> {
        self.find(selector)?.into_iter().next().ok_or_else(|| {
            tracing::debug!(selector, "no match");
            DomError::NotFound {
                selector: selector.to_string(),
            }
        })
    }

    /// The elements selected by a raw `XPath` expression evaluated from the
    /// root. Non-element nodes in the result are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::XPath`] if the expression fails to compile or
    /// does not produce a node-set.
    pub fn xpath(&self, expression: &str) -> Result<ResultSet> {
        select(&self.shared, expression, NodeId::ROOT)
    }

    /// The document element.
    #[must_use]
    pub fn root(&self) -> Option<Element> {
        let root = self.shared.tree.borrow().document_element()?;
        Some(Element::new(Rc::clone(&self.shared), root))
    }

    /// The whole document serialized as markup.
    #[must_use]
    pub fn html(&self) -> String {
        self.shared.tree.borrow().outer_html(NodeId::ROOT)
    }

    /// Errors recovered while parsing the document.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// The options the document was parsed with.
    #[must_use]
    pub fn options(&self) -> ParseOptions {
        self.shared.options
    }

    /// Read access to the underlying tree.
    ///
    /// # Panics
    ///
    /// Panics if an [`Element`] is mutating the tree. While the returned
    /// guard is alive, [`Element::set_attr`], [`Element::remove_attr`],
    /// [`Element::set_text`] and [`Element::set_html`] panic instead, so drop
    /// it before editing.
    #[must_use]
    pub fn tree(&self) -> Ref<'_, DomTree> {
        self.shared.tree.borrow()
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.shared.tree.borrow().len())
            .field("issues", &self.issues.len())
            .finish()
    }
}
