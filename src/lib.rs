//! ChatIntent: bag-of-words intent classification for short chat messages.
//!
//! A labelled corpus is normalized (stop words dropped, diacritics folded),
//! turned into a vocabulary and 0/1 feature vectors, and used to train a
//! two-layer sigmoid network by full-batch gradient descent. The trained
//! [`WeightSnapshot`] classifies new sentences into a ranked list of
//! `(category, confidence)` pairs.
//!
//! Uses structured logging via [`tracing`]. Set the `RUST_LOG` environment
//! variable to control log verbosity (e.g., `RUST_LOG=chatintent=debug`).

pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod model;
pub mod patterns;
pub mod responses;
pub mod scores;
pub mod snapshot;
pub mod tokenizer;
pub mod vocab;

use rand::Rng;

pub use crate::config::{ClassifyConfig, EngineConfig, TrainConfig};
pub use crate::corpus::{Corpus, LabelMode};
pub use crate::error::{ClassifierError, Result};
pub use crate::features::{encode_one, TrainingSet};
pub use crate::model::{train, Network, TrainReport};
pub use crate::responses::{Reply, ResponseTable};
pub use crate::scores::{rank, Prediction};
pub use crate::snapshot::WeightSnapshot;
pub use crate::tokenizer::normalize;

/// Classify one raw sentence against a trained snapshot.
///
/// Returns every category whose activation is strictly above `threshold`,
/// highest confidence first. An empty list means nothing matched.
pub fn classify(sentence: &str, snapshot: &WeightSnapshot, threshold: f64) -> Result<Vec<Prediction>> {
    let features = encode_one(sentence, snapshot.vocabulary());
    let known_words = features.iter().filter(|&&x| x > 0.0).count();
    let output = snapshot.network().infer_one(&features)?;
    let activations = output.to_vec();
    let predictions = rank(&activations, snapshot.categories(), threshold);

    tracing::debug!(
        sentence,
        known_words,
        activations = ?activations,
        matches = predictions.len(),
        top_category = predictions.first().map(|p| p.category.as_str()).unwrap_or("-"),
        top_confidence = predictions.first().map(|p| p.confidence).unwrap_or(0.0),
        "classify: output activations"
    );

    Ok(predictions)
}

/// Build the training set from a corpus and train a network on it.
pub fn train_from_corpus<R: Rng>(
    corpus: &Corpus,
    cfg: &TrainConfig,
    rng: &mut R,
) -> Result<(WeightSnapshot, TrainReport)> {
    let set = TrainingSet::from_corpus(corpus)?;
    tracing::info!(
        words = set.vocabulary.len(),
        categories = set.categories.len(),
        rows = set.rows(),
        "training set built"
    );
    train(&set, cfg, rng)
}
