//! Helper functions for the markup tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Parse error reporting

use dominic_common::warning::warn_once;

use super::state_machine::{MarkupTokenizer, TokenizerState};
use super::token::Token;
use crate::issue::{ParseIssue, ParseStage};

/// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
///
/// "generic RCDATA element parsing algorithm": title, textarea
const RCDATA_ELEMENTS: &[&str] = &["title", "textarea"];

/// "generic raw text element parsing algorithm": style, xmp, iframe, noembed,
/// noframes. Script data is tokenized the same way.
const RAWTEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

// =============================================================================
// State Transition Helpers
// =============================================================================

impl MarkupTokenizer {
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl MarkupTokenizer {
    /// "Consume the next input character"
    ///
    /// Returns None if we've reached the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// "If the next few characters are..."
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(target))
    }

    /// Consume the given ASCII string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }

    /// [ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "U+0009 TAB, U+000A LF, U+000C FF, U+000D CR, or U+0020 SPACE."
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }

    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer"
    ///
    /// Checked by lookahead: `/` then the name, then a character that can
    /// end a tag name.
    pub(super) fn at_appropriate_end_tag(&self) -> bool {
        let Some(name) = self.last_start_tag_name.as_deref() else {
            return false;
        };
        let rest = &self.input[self.current_pos..];
        let Some(after_slash) = rest.strip_prefix('/') else {
            return false;
        };
        let matches_name = after_slash
            .get(..name.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(name));
        matches_name
            && after_slash[name.len()..]
                .chars()
                .next()
                .is_none_or(|c| c == '/' || c == '>' || Self::is_whitespace_char(c))
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl MarkupTokenizer {
    /// Emit buffered character data as one text token.
    pub(super) fn flush_text(&mut self) {
        if !self.text_buffer.is_empty() {
            let data = std::mem::take(&mut self.text_buffer);
            self.token_stream.push(Token::Text { data });
        }
    }

    /// "Emit the current token" - adds the token to the output stream.
    ///
    /// Start tags of text-only elements switch the tokenizer to RCDATA or
    /// RAWTEXT, as the tree construction stage would.
    pub(super) fn emit_token(&mut self) {
        let Some(token) = self.current_token.take() else {
            return;
        };
        self.flush_text();

        if let Token::StartTag {
            ref name,
            self_closing,
            ..
        } = token
        {
            self.last_start_tag_name = Some(name.clone());
            let folded = name.to_ascii_lowercase();
            if !self_closing {
                if RCDATA_ELEMENTS.contains(&folded.as_str()) {
                    self.switch_to(TokenizerState::RcData);
                } else if RAWTEXT_ELEMENTS.contains(&folded.as_str()) {
                    self.switch_to(TokenizerState::RawText);
                }
            }
        }
        self.token_stream.push(token);
    }

    /// "Emit the current comment token."
    pub(super) fn emit_comment(&mut self) {
        self.flush_text();
        let data = std::mem::take(&mut self.comment_buffer);
        self.token_stream.push(Token::Comment { data });
    }

    /// "Emit the current DOCTYPE token."
    pub(super) fn emit_doctype(&mut self) {
        self.flush_text();
        let raw = std::mem::take(&mut self.comment_buffer);
        let name = raw
            .split_ascii_whitespace()
            .next()
            .map(str::to_ascii_lowercase);
        self.token_stream.push(Token::Doctype { name });
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.flush_text();
        self.token_stream.push(Token::EndOfFile);
        self.at_eof = true;
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl MarkupTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a recovered parse error. Parse errors are not fatal.
    pub(super) fn log_parse_error(&mut self, code: &str) {
        let offset = self.current_pos;
        warn_once(
            "Markup Tokenizer",
            &format!("{code} in {} state at offset {offset}", self.state),
        );
        self.issues.push(ParseIssue::new(ParseStage::Tokenizer, code, offset));
    }
}
