//! Named character reference table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html#named-character-references)
//!
//! A subset of the 2,231 named references: the markup-significant ones, the
//! legacy forms that may appear without a semicolon, and the Latin-1
//! punctuation, currency and letter entities that show up in real documents.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Entity names without `&` and without `;`, mapped to their replacement text.
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", "\u{A0}"),
        ("shy", "\u{AD}"),
        ("iexcl", "\u{A1}"),
        ("iquest", "\u{BF}"),
        ("sect", "\u{A7}"),
        ("para", "\u{B6}"),
        ("copy", "\u{A9}"),
        ("reg", "\u{AE}"),
        ("trade", "\u{2122}"),
        ("deg", "\u{B0}"),
        ("micro", "\u{B5}"),
        ("middot", "\u{B7}"),
        ("bull", "\u{2022}"),
        ("hellip", "\u{2026}"),
        ("ndash", "\u{2013}"),
        ("mdash", "\u{2014}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("sbquo", "\u{201A}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("bdquo", "\u{201E}"),
        ("laquo", "\u{AB}"),
        ("raquo", "\u{BB}"),
        ("dagger", "\u{2020}"),
        ("Dagger", "\u{2021}"),
        ("permil", "\u{2030}"),
        ("prime", "\u{2032}"),
        ("cent", "\u{A2}"),
        ("pound", "\u{A3}"),
        ("curren", "\u{A4}"),
        ("yen", "\u{A5}"),
        ("euro", "\u{20AC}"),
        ("times", "\u{D7}"),
        ("divide", "\u{F7}"),
        ("plusmn", "\u{B1}"),
        ("minus", "\u{2212}"),
        ("ne", "\u{2260}"),
        ("le", "\u{2264}"),
        ("ge", "\u{2265}"),
        ("infin", "\u{221E}"),
        ("frac14", "\u{BC}"),
        ("frac12", "\u{BD}"),
        ("frac34", "\u{BE}"),
        ("sup1", "\u{B9}"),
        ("sup2", "\u{B2}"),
        ("sup3", "\u{B3}"),
        ("larr", "\u{2190}"),
        ("uarr", "\u{2191}"),
        ("rarr", "\u{2192}"),
        ("darr", "\u{2193}"),
        ("harr", "\u{2194}"),
        ("hearts", "\u{2665}"),
        ("Aacute", "\u{C1}"),
        ("aacute", "\u{E1}"),
        ("Agrave", "\u{C0}"),
        ("agrave", "\u{E0}"),
        ("Auml", "\u{C4}"),
        ("auml", "\u{E4}"),
        ("Aring", "\u{C5}"),
        ("aring", "\u{E5}"),
        ("AElig", "\u{C6}"),
        ("aelig", "\u{E6}"),
        ("Ccedil", "\u{C7}"),
        ("ccedil", "\u{E7}"),
        ("Eacute", "\u{C9}"),
        ("eacute", "\u{E9}"),
        ("Egrave", "\u{C8}"),
        ("egrave", "\u{E8}"),
        ("Euml", "\u{CB}"),
        ("euml", "\u{EB}"),
        ("Iacute", "\u{CD}"),
        ("iacute", "\u{ED}"),
        ("Iuml", "\u{CF}"),
        ("iuml", "\u{EF}"),
        ("Ntilde", "\u{D1}"),
        ("ntilde", "\u{F1}"),
        ("Oacute", "\u{D3}"),
        ("oacute", "\u{F3}"),
        ("Ouml", "\u{D6}"),
        ("ouml", "\u{F6}"),
        ("Oslash", "\u{D8}"),
        ("oslash", "\u{F8}"),
        ("Uacute", "\u{DA}"),
        ("uacute", "\u{FA}"),
        ("Uuml", "\u{DC}"),
        ("uuml", "\u{FC}"),
        ("szlig", "\u{DF}"),
        ("yuml", "\u{FF}"),
    ])
});

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// Legacy references that are recognised even without a trailing semicolon.
const LEGACY_WITHOUT_SEMICOLON: &[&str] = &["amp", "lt", "gt", "quot", "nbsp", "copy", "reg"];

/// Look up a named character reference by its bare name (no `&`, no `;`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// Returns true if `name` may be used without a trailing semicolon.
#[must_use]
pub fn is_legacy_entity(name: &str) -> bool {
    LEGACY_WITHOUT_SEMICOLON.contains(&name)
}
