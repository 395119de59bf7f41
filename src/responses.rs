//! Canned replies per category.
//!
//! The table is read from an intents file, either a flat
//! `{"greeting": ["¡Hola!", ...]}` object or the legacy document that nests
//! it under `"Category"` with capitalized names. Category names are matched
//! case-insensitively.

use std::collections::BTreeMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClassifierError, Result};
use crate::scores::Prediction;

/// Category answered when nothing clears the threshold.
pub const FALLBACK_CATEGORY: &str = "noanswer";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntentsFile {
    Nested {
        #[serde(rename = "Category")]
        category: BTreeMap<String, Vec<String>>,
    },
    Flat(BTreeMap<String, Vec<String>>),
}

/// A reply chosen for a classified sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub category: String,
    pub text: String,
    /// Confidence of the prediction answered, 0.0 for the fallback.
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseTable {
    replies: BTreeMap<String, Vec<String>>,
}

impl ResponseTable {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: IntentsFile =
            serde_json::from_str(json).map_err(|e| ClassifierError::CorpusParse {
                phrase: e.to_string(),
                reason: "invalid intents file",
            })?;
        let raw = match file {
            IntentsFile::Nested { category } => category,
            IntentsFile::Flat(map) => map,
        };
        Ok(raw.into_iter().collect())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let table = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            categories = table.replies.len(),
            "response table loaded"
        );
        Ok(table)
    }

    pub fn insert(&mut self, category: &str, reply: impl Into<String>) {
        self.replies
            .entry(category.to_lowercase())
            .or_default()
            .push(reply.into());
    }

    pub fn replies(&self, category: &str) -> &[String] {
        self.replies
            .get(&category.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pick a reply for the top-ranked prediction, falling back to
    /// [`FALLBACK_CATEGORY`] when there is no prediction or the top category
    /// has no replies. `None` when the fallback is missing too.
    pub fn respond<R: Rng>(&self, predictions: &[Prediction], rng: &mut R) -> Option<Reply> {
        if let Some(top) = predictions.first() {
            if let Some(text) = self.replies(&top.category).choose(rng) {
                return Some(Reply {
                    category: top.category.clone(),
                    text: text.clone(),
                    confidence: top.confidence,
                });
            }
            debug!(category = %top.category, "no replies for category, falling back");
        }
        self.replies(FALLBACK_CATEGORY)
            .choose(rng)
            .map(|text| Reply {
                category: FALLBACK_CATEGORY.to_string(),
                text: text.clone(),
                confidence: 0.0,
            })
    }
}

impl FromIterator<(String, Vec<String>)> for ResponseTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (category, replies) in iter {
            for reply in replies {
                table.insert(&category, reply);
            }
        }
        table
    }
}
