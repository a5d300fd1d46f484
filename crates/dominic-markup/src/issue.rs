//! Recovered parse errors.

use strum_macros::Display;

/// The stage that reported a [`ParseIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ParseStage {
    /// Reported while tokenizing; the offset is a byte position in the input.
    #[strum(serialize = "tokenizer")]
    Tokenizer,
    /// Reported while building the tree; the offset is a token index.
    #[strum(serialize = "tree construction")]
    TreeConstruction,
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// "The handling of parse errors is well-defined"
///
/// Every recovered error is kept so callers can inspect how lenient the
/// parse had to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Which stage reported it.
    pub stage: ParseStage,
    /// Error code or description.
    pub message: String,
    /// Byte offset (tokenizer) or token index (tree construction).
    pub offset: usize,
}

impl ParseIssue {
    /// Create a new issue.
    #[must_use]
    pub fn new(stage: ParseStage, message: impl Into<String>, offset: usize) -> Self {
        Self {
            stage,
            message: message.into(),
            offset,
        }
    }
}

impl std::fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error at {}: {}", self.stage, self.offset, self.message)
    }
}
