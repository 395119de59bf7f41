//! Bag-of-words vectorization.
//!
//! A sentence becomes a 0/1 vector as wide as the vocabulary; the corpus
//! becomes a feature matrix `X` (one row per pattern instance) and a one-hot
//! label matrix `Y`. Rows are emitted in sorted-category, corpus-pattern
//! order, the same traversal the vocabulary builder uses, and `X`/`Y` are
//! paired purely by row position.

use ndarray::{Array1, Array2};

use crate::corpus::Corpus;
use crate::error::{ClassifierError, Result};
use crate::tokenizer::normalize;
use crate::vocab::{self, Vocabulary};

/// Encode one sentence against `vocabulary`.
///
/// Entry `i` is 1.0 iff `vocabulary[i]` occurs among the normalized tokens;
/// repeated words do not raise it past 1.0 and unknown words are ignored.
pub fn encode_one(sentence: &str, vocabulary: &Vocabulary) -> Array1<f64> {
    let mut bag = Array1::zeros(vocabulary.len());
    for token in normalize(sentence) {
        if let Some(i) = vocabulary.position(&token) {
            bag[i] = 1.0;
        }
    }
    bag
}

/// Encode the whole corpus into `(X, Y)`.
pub fn encode_corpus(
    corpus: &Corpus,
    vocabulary: &Vocabulary,
    categories: &[String],
) -> (Array2<f64>, Array2<f64>) {
    let rows = corpus.total_patterns();
    let mut features = Array2::zeros((rows, vocabulary.len()));
    let mut labels = Array2::zeros((rows, categories.len()));

    let mut row = 0;
    for (category, patterns) in corpus.iter() {
        let label = categories.iter().position(|c| c == category);
        for pattern in patterns {
            features.row_mut(row).assign(&encode_one(pattern, vocabulary));
            if let Some(q) = label {
                labels[[row, q]] = 1.0;
            }
            row += 1;
        }
    }

    (features, labels)
}

/// Everything the network engine needs from a corpus.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub vocabulary: Vocabulary,
    pub categories: Vec<String>,
    /// `X`: patterns x vocabulary
    pub features: Array2<f64>,
    /// `Y`: patterns x categories, one-hot rows
    pub labels: Array2<f64>,
}

impl TrainingSet {
    /// Build vocabulary, category list and both matrices in one pass over
    /// the sorted corpus.
    pub fn from_corpus(corpus: &Corpus) -> Result<Self> {
        let (vocabulary, categories) = vocab::build(corpus)?;
        let (features, labels) = encode_corpus(corpus, &vocabulary, &categories);
        Ok(Self {
            vocabulary,
            categories,
            features,
            labels,
        })
    }

    pub fn rows(&self) -> usize {
        self.features.nrows()
    }

    /// Check the shape invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.features.nrows() != self.labels.nrows() {
            return Err(ClassifierError::dimension(
                "label rows",
                self.features.nrows(),
                self.labels.nrows(),
            ));
        }
        if self.features.ncols() != self.vocabulary.len() {
            return Err(ClassifierError::dimension(
                "feature columns",
                self.vocabulary.len(),
                self.features.ncols(),
            ));
        }
        if self.labels.ncols() != self.categories.len() {
            return Err(ClassifierError::dimension(
                "label columns",
                self.categories.len(),
                self.labels.ncols(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn restaurant() -> Corpus {
        [
            ("greeting", "hola"),
            ("greeting", "buenos dias"),
            ("goodbye", "adios"),
            ("liked", "me gustó la comida"),
            ("liked", "la comida estuvo rica rica"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_encode_one_width_and_binary() {
        let set = TrainingSet::from_corpus(&restaurant()).unwrap();
        for sentence in ["", "hola hola hola", "comida rica", "palabra desconocida"] {
            let v = encode_one(sentence, &set.vocabulary);
            assert_eq!(v.len(), set.vocabulary.len());
            assert!(
                v.iter().all(|&x| x == 0.0 || x == 1.0),
                "{sentence:?} -> {v:?}"
            );
        }
    }

    #[test]
    fn test_encode_one_repeats_saturate() {
        let vocab = Vocabulary::from_words(vec!["rica".into(), "comida".into()]).unwrap();
        assert_eq!(encode_one("rica rica RICA", &vocab), array![1.0, 0.0]);
    }

    #[test]
    fn test_empty_sentence_is_zero_vector() {
        let set = TrainingSet::from_corpus(&restaurant()).unwrap();
        assert!(encode_one("", &set.vocabulary).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_row_counts_match_pattern_total() {
        let corpus = restaurant();
        let set = TrainingSet::from_corpus(&corpus).unwrap();
        assert_eq!(set.features.nrows(), corpus.total_patterns());
        assert_eq!(set.labels.nrows(), corpus.total_patterns());
        assert_eq!(set.labels.ncols(), set.categories.len());
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_label_rows_are_one_hot() {
        let set = TrainingSet::from_corpus(&restaurant()).unwrap();
        for row in set.labels.rows() {
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_rows_follow_sorted_categories() {
        let set = TrainingSet::from_corpus(&restaurant()).unwrap();
        assert_eq!(set.categories, vec!["goodbye", "greeting", "liked"]);
        let label_of = |r: usize| set.labels.row(r).iter().position(|&x| x == 1.0).unwrap();
        let labels: Vec<usize> = (0..set.rows()).map(label_of).collect();
        assert_eq!(labels, vec![0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_two_category_identity() {
        let corpus: Corpus = [("greeting", "hola"), ("goodbye", "adios")]
            .into_iter()
            .collect();
        let set = TrainingSet::from_corpus(&corpus).unwrap();
        assert_eq!(set.features, Array2::<f64>::eye(2));
        assert_eq!(set.labels, Array2::<f64>::eye(2));
    }

    #[test]
    fn test_validate_catches_row_mismatch() {
        let mut set = TrainingSet::from_corpus(&restaurant()).unwrap();
        set.labels = Array2::zeros((2, set.categories.len()));
        assert!(matches!(
            set.validate(),
            Err(ClassifierError::DimensionMismatch { context: "label rows", .. })
        ));
    }
}
