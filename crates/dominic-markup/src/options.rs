//! Parser configuration.

/// Options controlling how lenient markup is turned into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fold tag and attribute names to ASCII lowercase, as HTML does.
    pub lowercase_names: bool,
    /// Keep text nodes that contain only whitespace.
    pub keep_whitespace_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            lowercase_names: true,
            keep_whitespace_text: true,
        }
    }
}

impl ParseOptions {
    /// Set whether names are folded to lowercase.
    #[must_use]
    pub const fn with_lowercase_names(mut self, lowercase_names: bool) -> Self {
        self.lowercase_names = lowercase_names;
        self
    }

    /// Set whether whitespace-only text nodes are kept.
    #[must_use]
    pub const fn with_keep_whitespace_text(mut self, keep: bool) -> Self {
        self.keep_whitespace_text = keep;
        self
    }
}
