//! Markup serialization for [`DomTree`] nodes.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! A reduced form of the HTML fragment serialization algorithm: attribute
//! values are always double-quoted, void elements get no end tag and the
//! contents of raw text elements are written verbatim.

use crate::{DomTree, NodeId, NodeType};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr"
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text children are serialized without escaping.
///
/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element... then append the value of current node's
/// data literally."
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Returns true if `tag` is a void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

impl DomTree {
    /// [§ 4.9 outerHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-outerhtml)
    ///
    /// Serializes `id` together with its own tag. For the document and
    /// fragment nodes this is the same as [`DomTree::inner_html`].
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, &mut out);
        out
    }

    /// [§ 4.9 innerHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml)
    ///
    /// Serializes the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_children(id, &mut out);
        out
    }

    fn serialize_children(&self, id: NodeId, out: &mut String) {
        let raw = self
            .as_element(id)
            .is_some_and(|e| RAW_TEXT_ELEMENTS.contains(&e.tag_name.as_str()));
        for &child in self.children(id) {
            match self.as_text(child) {
                Some(text) if raw => out.push_str(text),
                _ => self.serialize_node(child, out),
            }
        }
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document | NodeType::DocumentFragment => self.serialize_children(id, out),
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                for (name, value) in &data.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if is_void_element(&data.tag_name) {
                    return;
                }
                self.serialize_children(id, out);
                out.push_str("</");
                out.push_str(&data.tag_name);
                out.push('>');
            }
            NodeType::Text(text) => escape_into(text, false, out),
            NodeType::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
        }
    }
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Replace any occurrence of the "&" character by the string "&amp;"...
/// If the algorithm was invoked in the attribute mode, replace any occurrences
/// of the """ character by the string "&quot;"."
///
/// `<` and `>` are escaped in both modes.
fn escape_into(text: &str, attribute_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
