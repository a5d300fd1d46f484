//! Selector errors.

/// A selector the translator cannot express.
///
/// Raised before any `XPath` is produced. The translator never returns a
/// partial path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed selector {selector:?} at offset {position}: {reason}")]
pub struct MalformedSelector {
    /// The selector as given.
    pub selector: String,
    /// Byte offset of the offending character.
    pub position: usize,
    /// What was wrong.
    pub reason: String,
}
