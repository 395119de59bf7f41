//! Training corpus: category name -> ordered pattern strings.
//!
//! Categories live in a `BTreeMap`, so every traversal is lexicographic by
//! category name. Vocabulary indices, category indices and training-row order
//! all derive from that traversal and are therefore reproducible.
//!
//! Two on-disk sources are supported: the delimited chat format
//! (`#<pattern> (<label>)` phrases) and a JSON object of arrays.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClassifierError, Result};
use crate::patterns::{LABEL_RE, LABEL_SEPARATOR, PHRASE_TERMINATOR, TEXT_RE};

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// Immutable-after-build mapping from category to its patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    entries: BTreeMap<String, Vec<String>>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pattern to a category, creating the category if needed.
    pub fn insert(&mut self, category: impl Into<String>, pattern: impl Into<String>) {
        self.entries
            .entry(category.into())
            .or_default()
            .push(pattern.into());
    }

    /// Categories in lexicographic order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn patterns(&self, category: &str) -> Option<&[String]> {
        self.entries.get(category).map(Vec::as_slice)
    }

    /// `(category, patterns)` pairs in lexicographic category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn category_count(&self) -> usize {
        self.entries.len()
    }

    /// Training rows this corpus produces: one per pattern instance.
    pub fn total_patterns(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// True when there is nothing to train on.
    pub fn is_empty(&self) -> bool {
        self.total_patterns() == 0
    }
}

impl<C, P> FromIterator<(C, P)> for Corpus
where
    C: Into<String>,
    P: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, P)>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for (category, pattern) in iter {
            corpus.insert(category, pattern);
        }
        corpus
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// How comma-joined labels such as `food,order,pizza` are filed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelMode {
    /// Keep the whole label as one opaque category.
    #[default]
    Compound,
    /// File the pattern under every comma-separated label.
    Split,
}

/// Parse the delimited chat format.
///
/// The text is cut after every `)`. Each non-blank phrase must carry a
/// parenthesized label; the pattern is the text between `#` and the space
/// before the label. A labelled phrase without pattern text, such as
/// `#(noanswer)`, contributes an empty pattern.
pub fn parse_chat_corpus(text: &str, mode: LabelMode) -> Result<Corpus> {
    let mut corpus = Corpus::new();

    for phrase in text.split_inclusive(PHRASE_TERMINATOR) {
        if phrase.trim().is_empty() {
            continue;
        }

        let label = LABEL_RE
            .captures(phrase)
            .map(|c| c[1].to_string())
            .ok_or_else(|| ClassifierError::CorpusParse {
                phrase: phrase.trim().to_string(),
                reason: "missing parenthesized label",
            })?;

        let pattern = TEXT_RE
            .captures(phrase)
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        match mode {
            LabelMode::Compound => corpus.insert(label, pattern),
            LabelMode::Split => {
                for part in label.split(LABEL_SEPARATOR) {
                    corpus.insert(part, pattern.clone());
                }
            }
        }
    }

    debug!(
        categories = corpus.category_count(),
        patterns = corpus.total_patterns(),
        "parsed chat corpus"
    );
    Ok(corpus)
}

/// Parse a JSON object of `category -> [pattern, ...]`.
pub fn parse_json_corpus(json: &str) -> Result<Corpus> {
    serde_json::from_str(json).map_err(|e| ClassifierError::CorpusParse {
        phrase: e.to_string(),
        reason: "invalid JSON corpus",
    })
}

/// Load a corpus from disk; `.json` files are read as JSON, anything else as
/// the chat format.
pub fn load_corpus(path: &Path, mode: LabelMode) -> Result<Corpus> {
    let text = std::fs::read_to_string(path)?;
    let corpus = if path.extension().map(|e| e == "json").unwrap_or(false) {
        parse_json_corpus(&text)?
    } else {
        parse_chat_corpus(&text, mode)?
    };
    info!(
        path = %path.display(),
        categories = corpus.category_count(),
        patterns = corpus.total_patterns(),
        "corpus loaded"
    );
    Ok(corpus)
}
