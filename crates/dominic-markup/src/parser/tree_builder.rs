use dominic_common::warning::warn_once;
use dominic_dom::serialize::is_void_element;
use dominic_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::issue::{ParseIssue, ParseStage};
use crate::options::ParseOptions;
use crate::tokenizer::{Attribute, Token};

/// [§ 13.1.2.4 Optional tags](https://html.spec.whatwg.org/multipage/syntax.html#optional-tags)
///
/// Elements whose end tag may be omitted. Leaving them open is not reported.
const OPTIONAL_END_TAGS: &[&str] = &[
    "html", "head", "body", "p", "li", "dt", "dd", "option", "optgroup", "colgroup", "caption",
    "thead", "tbody", "tfoot", "tr", "td", "th", "rb", "rt", "rtc", "rp",
];

/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// "A start tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", ... "ul" - If the stack of open elements has a p element in
/// button scope, then close a p element."
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "dir", "div", "dl",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "summary",
    "table", "ul",
];

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// "The stack of open elements is said to have an element target node in a
/// specific scope consisting of a list of element types list when..."
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// "has an element in button scope": the default scope plus button.
const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];

/// "has an element in list item scope": the default scope plus ol and ul.
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol",
    "ul",
];

/// "has an element in table scope": html, table, template.
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// Table scope plus tr, so a new cell only closes cells of the same row.
const ROW_SCOPE: &[&str] = &["html", "table", "template", "tr"];

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// A lenient tree builder. It keeps the stack of open elements and the
/// implied end tag rules of the "in body" insertion mode, but does not
/// synthesize `html`/`head`/`body` and does not run the adoption agency
/// algorithm. Mis-nested end tags close everything above the matching element.
pub struct TreeBuilder<'a> {
    tokens: Vec<Token>,

    tree: &'a mut DomTree,

    /// Node that receives top-level content (the document or a fragment).
    container: NodeId,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    open_elements: Vec<NodeId>,

    options: ParseOptions,

    issues: Vec<ParseIssue>,

    token_index: usize,
}

impl<'a> TreeBuilder<'a> {
    /// Create a tree builder that appends content to `container` in `tree`.
    #[must_use]
    pub fn new(
        tokens: Vec<Token>,
        tree: &'a mut DomTree,
        container: NodeId,
        options: ParseOptions,
    ) -> Self {
        Self {
            tokens,
            tree,
            container,
            open_elements: Vec::new(),
            options,
            issues: Vec::new(),
            token_index: 0,
        }
    }

    /// Build the tree from the tokens, returning the recovered parse errors.
    #[must_use]
    pub fn run(mut self) -> Vec<ParseIssue> {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.into_iter().enumerate() {
            self.token_index = index;
            match token {
                Token::Doctype { .. } => self.handle_doctype(),
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => self.handle_start_tag(name, self_closing, attributes),
                Token::EndTag { name } => self.handle_end_tag(&name),
                Token::Comment { data } => self.insert_node(NodeType::Comment(data)),
                Token::Text { data } => self.insert_text(&data),
                Token::EndOfFile => break,
            }
        }
        self.handle_eof();
        self.issues
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    ///
    /// A DOCTYPE is accepted before any content and otherwise ignored.
    fn handle_doctype(&mut self) {
        let seen_content = !self.open_elements.is_empty()
            || self
                .tree
                .children(self.container)
                .iter()
                .any(|&c| self.tree.is_element(c));
        if seen_content {
            self.parse_error("unexpected DOCTYPE after content".to_string());
        }
    }

    fn handle_start_tag(&mut self, name: String, self_closing: bool, attributes: Vec<Attribute>) {
        let folded = name.to_ascii_lowercase();
        self.close_elements_implied_by(&folded);

        let element = self.create_element(name, attributes);
        let parent = self.current_node();
        self.tree.append_child(parent, element);

        // "Acknowledge the token's self-closing flag" for void elements; for
        // anything else the flag is honoured as an empty element.
        if !self_closing && !is_void_element(&folded) {
            self.open_elements.push(element);
        }
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag": walk the stack of open elements down to the
    /// matching element and pop everything above it.
    fn handle_end_tag(&mut self, name: &str) {
        if is_void_element(name) {
            self.parse_error(format!("end tag </{name}> for a void element ignored"));
            return;
        }

        let Some(index) = self.find_open(&[name], &[]) else {
            self.parse_error(format!("unexpected end tag </{name}> ignored"));
            return;
        };

        let unclosed: Vec<String> = self.open_elements[index + 1..]
            .iter()
            .filter_map(|&id| self.tree.as_element(id))
            .map(|data| data.tag_name.clone())
            .filter(|tag| !Self::end_tag_is_optional(tag))
            .collect();
        for tag in unclosed {
            self.parse_error(format!("<{tag}> implicitly closed by </{name}>"));
        }
        self.open_elements.truncate(index);
    }

    /// "An end-of-file token - If there is a node in the stack of open elements
    /// that is not ... then this is a parse error. Stop parsing."
    fn handle_eof(&mut self) {
        let unclosed: Vec<String> = self
            .open_elements
            .iter()
            .filter_map(|&id| self.tree.as_element(id))
            .map(|data| data.tag_name.clone())
            .filter(|tag| !Self::end_tag_is_optional(tag))
            .collect();
        for tag in unclosed {
            self.parse_error(format!("<{tag}> still open at end of input"));
        }
        self.open_elements.clear();
    }

    /// Start tags that close elements left open by an omitted end tag.
    fn close_elements_implied_by(&mut self, tag: &str) {
        if CLOSES_P.contains(&tag) {
            self.close_open(&["p"], BUTTON_SCOPE);
        }
        match tag {
            // "A start tag whose tag name is "li""
            "li" => self.close_open(&["li"], LIST_ITEM_SCOPE),
            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.close_open(&["dd", "dt"], DEFAULT_SCOPE),
            // "If the current node is an option element, then pop the current node"
            "option" => self.close_current_if(&["option"]),
            "optgroup" => {
                self.close_current_if(&["option"]);
                self.close_current_if(&["optgroup"]);
            }
            "tbody" | "thead" | "tfoot" => {
                self.close_open(&["tbody", "thead", "tfoot"], TABLE_SCOPE);
            }
            "tr" => self.close_open(&["tr"], TABLE_SCOPE),
            "td" | "th" => self.close_open(&["td", "th"], ROW_SCOPE),
            _ => {}
        }
    }

    /// Pop up to and including the topmost open element named in `tags`,
    /// if one is in the given scope.
    fn close_open(&mut self, tags: &[&str], scope: &[&str]) {
        if let Some(index) = self.find_open(tags, scope) {
            self.open_elements.truncate(index);
        }
    }

    fn close_current_if(&mut self, tags: &[&str]) {
        let current_matches = self
            .open_elements
            .last()
            .is_some_and(|&id| self.tag_is_one_of(id, tags));
        if current_matches {
            let _ = self.open_elements.pop();
        }
    }

    /// Index in the stack of the topmost element named in `tags`, searching
    /// from the current node down and stopping at any element named in `scope`.
    fn find_open(&self, tags: &[&str], scope: &[&str]) -> Option<usize> {
        for (index, &id) in self.open_elements.iter().enumerate().rev() {
            if self.tag_is_one_of(id, tags) {
                return Some(index);
            }
            if self.tag_is_one_of(id, scope) {
                return None;
            }
        }
        None
    }

    fn tag_is_one_of(&self, id: NodeId, tags: &[&str]) -> bool {
        self.tree
            .as_element(id)
            .is_some_and(|data| tags.iter().any(|t| data.tag_name.eq_ignore_ascii_case(t)))
    }

    fn end_tag_is_optional(tag: &str) -> bool {
        OPTIONAL_END_TAGS
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// Duplicate attributes are dropped, keeping the first, as the tokenizer
    /// would: "if there is already an attribute on the token with the exact
    /// same name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    fn create_element(&mut self, name: String, attributes: Vec<Attribute>) -> NodeId {
        let mut data = ElementData {
            tag_name: name,
            ..ElementData::default()
        };
        for attr in attributes {
            if attr.name.is_empty() {
                continue;
            }
            if data.attrs.contains_key(&attr.name) {
                self.parse_error(format!(
                    "duplicate attribute {:?} on <{}>",
                    attr.name, data.tag_name
                ));
                continue;
            }
            data.set_attribute(attr.name, attr.value);
        }
        self.tree.alloc(NodeType::Element(data))
    }

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> NodeId {
        self.open_elements
            .last()
            .copied()
            .unwrap_or(self.container)
    }

    fn insert_node(&mut self, node_type: NodeType) {
        let parent = self.current_node();
        let id = self.tree.alloc(node_type);
        self.tree.append_child(parent, id);
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data."
    fn insert_text(&mut self, data: &str) {
        if !self.options.keep_whitespace_text && data.chars().all(char::is_whitespace) {
            return;
        }
        let parent = self.current_node();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(existing) = self.tree.as_text_mut(last)
        {
            existing.push_str(data);
            return;
        }
        let id = self.tree.alloc_text(data);
        self.tree.append_child(parent, id);
    }

    fn parse_error(&mut self, message: String) {
        warn_once("Markup Tree Builder", &message);
        self.issues.push(ParseIssue::new(
            ParseStage::TreeConstruction,
            message,
            self.token_index,
        ));
    }
}
