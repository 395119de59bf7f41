//! Shared lexical constants.
//!
//! The closed stop-word list used by the tokenizer and the pre-compiled
//! regexes used to split chat-corpus phrases into pattern text and label.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Stop words
// ---------------------------------------------------------------------------

/// Spanish articles, prepositions, fillers and punctuation tokens that carry
/// no intent signal. Matched against the lowercased raw token, before
/// diacritics are stripped.
pub const STOP_WORDS: &[&str] = &[
    "la", "a", "un", "una", "?", "!", "el", "con", "sin", "en", "para", "por", ".", "siempre",
    "desde", "los", "las", "me", "que", "tan", "de", "favor",
];

pub static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Case-insensitive membership test against [`STOP_WORDS`].
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token.to_lowercase().as_str())
}

// ---------------------------------------------------------------------------
// Chat corpus phrases: `#<pattern text> (<label>)`
// ---------------------------------------------------------------------------

/// Phrase terminator; the corpus is split after every occurrence.
pub const PHRASE_TERMINATOR: char = ')';

/// Parenthesized label, possibly a comma-joined multi-label key.
pub static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.+)\)").unwrap());

/// Pattern text between `#` and the whitespace preceding the label.
pub static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(.+)\s\(").unwrap());

/// Separator inside multi-label keys such as `food,order,pizza`.
pub const LABEL_SEPARATOR: char = ',';
