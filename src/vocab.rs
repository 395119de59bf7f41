//! Vocabulary and category list construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::{ClassifierError, Result};
use crate::tokenizer::normalize;

/// Ordered, de-duplicated word list. Position is the feature index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an already ordered word list; duplicates are rejected.
    pub fn from_words(words: Vec<String>) -> Result<Self> {
        let mut vocab = Self::new();
        for word in words {
            if !vocab.push(word.clone()) {
                return Err(ClassifierError::snapshot(format!(
                    "duplicate vocabulary word {word:?}"
                )));
            }
        }
        Ok(vocab)
    }

    /// Append `word` if unseen. Returns whether it was inserted.
    pub fn push(&mut self, word: String) -> bool {
        if self.index.contains_key(&word) {
            return false;
        }
        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        true
    }

    pub fn position(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = ClassifierError;

    fn try_from(words: Vec<String>) -> Result<Self> {
        Self::from_words(words)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.words
    }
}

/// Scan the corpus once, in sorted category order, collecting first-seen
/// words and category names.
///
/// Fails with [`ClassifierError::EmptyCorpus`] when no category holds a
/// pattern, since the resulting training matrix would have zero rows.
pub fn build(corpus: &Corpus) -> Result<(Vocabulary, Vec<String>)> {
    if corpus.is_empty() {
        return Err(ClassifierError::EmptyCorpus);
    }

    let mut vocabulary = Vocabulary::new();
    let mut categories: Vec<String> = Vec::with_capacity(corpus.category_count());

    for (category, patterns) in corpus.iter() {
        for pattern in patterns {
            for token in normalize(pattern) {
                vocabulary.push(token);
            }
        }
        if !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }

    Ok((vocabulary, categories))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(pairs: &[(&str, &str)]) -> Corpus {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_greeting_goodbye_scenario() {
        let c = corpus(&[("greeting", "hola"), ("goodbye", "adios")]);
        let (vocab, cats) = build(&c).unwrap();
        // categories are scanned sorted, so goodbye's words come first
        assert_eq!(vocab.words(), &["adios".to_string(), "hola".to_string()]);
        assert_eq!(cats, vec!["goodbye", "greeting"]);
    }

    #[test]
    fn test_first_seen_order_and_dedup() {
        let c = corpus(&[
            ("b", "pizza grande"),
            ("a", "quiero pizza"),
            ("a", "grande"),
        ]);
        let (vocab, cats) = build(&c).unwrap();
        assert_eq!(
            vocab.words(),
            &["quiero".to_string(), "pizza".to_string(), "grande".to_string()]
        );
        assert_eq!(cats, vec!["a", "b"]);
        assert_eq!(vocab.position("grande"), Some(2));
    }

    #[test]
    fn test_vocabulary_is_normalized() {
        let c = corpus(&[("liked", "Me gustó la comida")]);
        let (vocab, _) = build(&c).unwrap();
        assert_eq!(vocab.words(), &["gusto".to_string(), "comida".to_string()]);
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(matches!(
            build(&Corpus::new()),
            Err(ClassifierError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_category_with_only_empty_pattern_is_kept() {
        let c = corpus(&[("noanswer", ""), ("thanks", "gracias")]);
        let (vocab, cats) = build(&c).unwrap();
        assert_eq!(vocab.words(), &["gracias".to_string()]);
        assert_eq!(cats, vec!["noanswer", "thanks"]);
    }

    #[test]
    fn test_from_words_rejects_duplicates() {
        let err = Vocabulary::from_words(vec!["hola".into(), "hola".into()]).unwrap_err();
        assert!(matches!(err, ClassifierError::SnapshotLoad(_)));
    }

    #[test]
    fn test_serde_as_plain_list() {
        let vocab = Vocabulary::from_words(vec!["hola".into(), "adios".into()]).unwrap();
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["hola","adios"]"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab);
    }
}
