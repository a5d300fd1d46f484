//! Character reference decoding for the tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Unlike the state-per-step formulation, references are resolved with
//! lookahead at the point the `&` is seen: nothing is consumed unless a
//! reference is recognised, so an unrecognised `&` stays literal.

use super::state_machine::MarkupTokenizer;
use super::named_character_references::{is_legacy_entity, lookup_entity};

/// Longest entity name we try to match.
const MAX_NAME_LEN: usize = 32;

impl MarkupTokenizer {
    /// Decode the character reference following an already consumed `&`.
    ///
    /// Returns the replacement text, or `"&"` if no reference was recognised.
    pub(super) fn consume_character_reference(&mut self, in_attribute: bool) -> String {
        match self.peek_codepoint(0) {
            Some('#') => self.consume_numeric_character_reference(),
            Some(c) if c.is_ascii_alphanumeric() => {
                self.consume_named_character_reference(in_attribute)
            }
            _ => "&".to_string(),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    fn consume_numeric_character_reference(&mut self) -> String {
        let hex = matches!(self.peek_codepoint(1), Some('x' | 'X'));
        let prefix_len = if hex { 2 } else { 1 };
        let radix = if hex { 16 } else { 10 };

        let digits: String = (prefix_len..)
            .map_while(|i| self.peek_codepoint(i).filter(|c| c.is_digit(radix)))
            .collect();

        if digits.is_empty() {
            // "absence-of-digits-in-numeric-character-reference parse error"
            self.log_parse_error("absence-of-digits-in-numeric-character-reference");
            return "&".to_string();
        }

        for _ in 0..prefix_len + digits.chars().count() {
            let _ = self.consume();
        }
        if self.peek_codepoint(0) == Some(';') {
            let _ = self.consume();
        } else {
            self.log_parse_error("missing-semicolon-after-character-reference");
        }

        // Anything that overflows is out of range anyway.
        let code = u32::from_str_radix(&digits, radix).unwrap_or(u32::MAX);

        // [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
        // "If the number is 0x00... or greater than 0x10FFFF... or a surrogate,
        // set the character reference code to 0xFFFD."
        if code == 0 {
            self.log_parse_error("null-character-reference");
        }
        let decoded = char::from_u32(code)
            .filter(|&c| c != '\0')
            .unwrap_or_else(|| {
                if code != 0 {
                    self.log_parse_error("character-reference-outside-unicode-range");
                }
                '\u{FFFD}'
            });
        decoded.to_string()
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the named character references table."
    fn consume_named_character_reference(&mut self, in_attribute: bool) -> String {
        let candidate: String = (0..MAX_NAME_LEN)
            .map_while(|i| self.peek_codepoint(i).filter(char::is_ascii_alphanumeric))
            .collect();

        for len in (1..=candidate.len()).rev() {
            let name = &candidate[..len];
            let Some(replacement) = lookup_entity(name) else {
                continue;
            };
            let next = self.peek_codepoint(len);

            if next == Some(';') {
                for _ in 0..=len {
                    let _ = self.consume();
                }
                return replacement.to_string();
            }

            if !is_legacy_entity(name) {
                continue;
            }

            // "If the character reference was consumed as part of an attribute,
            // and the last character matched is not a semicolon, and the next
            // input character is either a U+003D EQUALS SIGN character (=) or an
            // ASCII alphanumeric, then, for historical reasons, flush code points
            // consumed as a character reference"
            if in_attribute && next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric()) {
                return "&".to_string();
            }

            self.log_parse_error("missing-semicolon-after-character-reference");
            for _ in 0..len {
                let _ = self.consume();
            }
            return replacement.to_string();
        }

        if self.peek_codepoint(candidate.len()) == Some(';') {
            self.log_parse_error("unknown-named-character-reference");
        }
        "&".to_string()
    }
}
