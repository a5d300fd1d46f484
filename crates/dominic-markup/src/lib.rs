//! Lenient markup parser for the dominic crates.
//!
//! # Scope
//!
//! This crate turns markup text into a [`DomTree`]:
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA and RAWTEXT states, tags, attributes, comments, DOCTYPE
//!   - Numeric and common named character references
//!
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Stack of open elements with the implied end tags of the "in body" mode
//!   - Void elements, self-closing syntax, stray end tags
//!
//! Parsing never fails. Every recovered error is reported once through
//! `tracing` and returned as a [`ParseIssue`].
//!
//! # Not Implemented
//!
//! - Implied `html`/`head`/`body` elements (the tree mirrors the markup)
//! - Table foster parenting and the adoption agency algorithm
//! - Script data escape states

/// Recovered parse errors.
pub mod issue;
/// Parser configuration.
pub mod options;
/// Tree construction.
pub mod parser;
/// Markup tokenizer.
pub mod tokenizer;

pub use issue::{ParseIssue, ParseStage};
pub use options::ParseOptions;
pub use parser::TreeBuilder;
pub use tokenizer::{Attribute, MarkupTokenizer, Token};

use dominic_dom::{DomTree, NodeId, NodeType};

/// A parsed document and the errors recovered while parsing it.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The parsed tree, rooted at [`NodeId::ROOT`].
    pub tree: DomTree,
    /// Recovered parse errors, tokenizer errors first.
    pub issues: Vec<ParseIssue>,
}

/// A fragment parsed into an existing tree.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Detached `DocumentFragment` node holding the parsed nodes.
    pub container: NodeId,
    /// Recovered parse errors, tokenizer errors first.
    pub issues: Vec<ParseIssue>,
}

/// Tokenize `markup`, returning the tokens and tokenizer errors.
#[must_use]
pub fn tokenize(markup: &str, options: &ParseOptions) -> (Vec<Token>, Vec<ParseIssue>) {
    let mut tokenizer = MarkupTokenizer::new(markup).with_lowercase_names(options.lowercase_names);
    tokenizer.run();
    tokenizer.into_parts()
}

/// Parse a complete document.
///
/// Top-level nodes become children of the document node; no elements are
/// implied, so `<p>x</p>` yields a document whose document element is `p`.
#[must_use]
pub fn parse_document(markup: &str, options: &ParseOptions) -> ParseOutput {
    let (tokens, mut issues) = tokenize(markup, options);
    let mut tree = DomTree::new();
    let root = tree.root();
    issues.extend(TreeBuilder::new(tokens, &mut tree, root, *options).run());

    tracing::debug!(
        nodes = tree.len(),
        issues = issues.len(),
        "parsed markup document"
    );
    ParseOutput { tree, issues }
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `markup` into `tree` under a new, detached `DocumentFragment` node.
/// The caller moves the fragment's children wherever they belong.
pub fn parse_fragment_into(tree: &mut DomTree, markup: &str, options: &ParseOptions) -> Fragment {
    let (tokens, mut issues) = tokenize(markup, options);
    let container = tree.alloc(NodeType::DocumentFragment);
    issues.extend(TreeBuilder::new(tokens, tree, container, *options).run());

    tracing::debug!(
        nodes = tree.children(container).len(),
        issues = issues.len(),
        "parsed markup fragment"
    );
    Fragment { container, issues }
}

/// Parse `markup` as a fragment into a tree of its own.
#[must_use]
pub fn parse_fragment(markup: &str, options: &ParseOptions) -> (DomTree, Fragment) {
    let mut tree = DomTree::new();
    let fragment = parse_fragment_into(&mut tree, markup, options);
    (tree, fragment)
}
