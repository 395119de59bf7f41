//! Sentence normalization.
//!
//! `normalize` splits on Unicode whitespace, drops stop words, strips
//! diacritics (NFD, remove combining marks, NFC) and lowercases. It is pure
//! and order-preserving; the same function feeds vocabulary building,
//! training vectors and inference vectors, so all three agree on tokens.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::patterns::is_stop_word;

/// Turn a raw sentence into its retained, normalized word tokens.
pub fn normalize(sentence: &str) -> Vec<String> {
    sentence
        .split_whitespace()
        .filter(|token| !is_stop_word(token))
        .map(fold_token)
        .collect()
}

/// Strip diacritical marks and lowercase a single token.
pub fn fold_token(token: &str) -> String {
    let stripped: String = token
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect();
    stripped.to_lowercase()
}
