//! Markup tokenizer module.
//!
//! Implements a reduced form of [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.

/// Character reference decoding per § 13.2.5.72.
pub mod character_reference;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Tokenizer state machine implementation.
pub mod state_machine;
/// Token types produced by the tokenizer.
pub mod token;

pub use state_machine::{MarkupTokenizer, TokenizerState};
pub use token::{Attribute, Token};
