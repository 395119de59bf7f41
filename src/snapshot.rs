//! Weight snapshot: the trained matrices plus the vocabulary and category
//! list they index, and its JSON persistence.
//!
//! On disk the snapshot keeps the legacy model-file layout:
//!
//! ```text
//! {"Synapse_0": {"Rows": V, "Cols": H, "Stride": H, "Data": [...]},
//!  "Synapse_1": {"Rows": H, "Cols": C, "Stride": C, "Data": [...]},
//!  "Words": [...], "Categories": [...]}
//! ```
//!
//! `Data` is row-major. A loaded snapshot is checked against every shape
//! invariant before it is handed out, and is never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{ClassifierError, Result};
use crate::model::Network;
use crate::vocab::Vocabulary;

/// Version prefix for snapshot fingerprints. Bump when the layout changes.
const SNAPSHOT_HASH_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq)]
pub struct WeightSnapshot {
    network: Network,
    vocabulary: Vocabulary,
    categories: Vec<String>,
}

impl WeightSnapshot {
    /// Bundle a network with its vocabulary and categories.
    ///
    /// `W0` must have one row per vocabulary word and `W1` one column per
    /// category.
    pub fn new(network: Network, vocabulary: Vocabulary, categories: Vec<String>) -> Result<Self> {
        if network.input_size() != vocabulary.len() {
            return Err(ClassifierError::dimension(
                "W0 rows vs vocabulary",
                vocabulary.len(),
                network.input_size(),
            ));
        }
        if network.output_size() != categories.len() {
            return Err(ClassifierError::dimension(
                "W1 columns vs categories",
                categories.len(),
                network.output_size(),
            ));
        }
        Ok(Self {
            network,
            vocabulary,
            categories,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn hidden_size(&self) -> usize {
        self.network.hidden_size()
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.record())
            .map_err(|e| ClassifierError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: SnapshotRecord =
            serde_json::from_str(json).map_err(|e| ClassifierError::snapshot(e.to_string()))?;
        record.into_snapshot()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        info!(
            path = %path.display(),
            fingerprint = %self.fingerprint(),
            "snapshot saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::snapshot(format!("cannot read {}: {e}", path.display()))
        })?;
        let snapshot = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            fingerprint = %snapshot.fingerprint(),
            words = snapshot.vocabulary.len(),
            categories = snapshot.categories.len(),
            hidden = snapshot.hidden_size(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// SHA-256 over the versioned JSON encoding, as `sha256:<hex>`.
    pub fn fingerprint(&self) -> String {
        let serialized = serde_json::to_vec(&self.record())
            .unwrap_or_else(|_| format!("{:?}", self).into_bytes());
        let mut hasher = Sha256::new();
        hasher.update(SNAPSHOT_HASH_VERSION.as_bytes());
        hasher.update(&serialized);
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    fn record(&self) -> SnapshotRecord {
        SnapshotRecord {
            synapse_0: DenseMatrix::from(self.network.w0()),
            synapse_1: DenseMatrix::from(self.network.w1()),
            words: self.vocabulary.clone(),
            categories: self.categories.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(rename = "Synapse_0")]
    synapse_0: DenseMatrix,
    #[serde(rename = "Synapse_1")]
    synapse_1: DenseMatrix,
    #[serde(rename = "Words")]
    words: Vocabulary,
    #[serde(rename = "Categories")]
    categories: Vec<String>,
}

impl SnapshotRecord {
    fn into_snapshot(self) -> Result<WeightSnapshot> {
        let w0 = self.synapse_0.into_array("Synapse_0")?;
        let w1 = self.synapse_1.into_array("Synapse_1")?;
        let network = Network::from_weights(w0, w1)?;
        if let Some(dup) = first_duplicate(&self.categories) {
            return Err(ClassifierError::snapshot(format!(
                "duplicate category {dup:?}"
            )));
        }
        WeightSnapshot::new(network, self.words, self.categories)
    }
}

fn first_duplicate(names: &[String]) -> Option<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names.iter().find(|n| !seen.insert(n.as_str())).cloned()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DenseMatrix {
    rows: usize,
    cols: usize,
    #[serde(default)]
    stride: Option<usize>,
    data: Vec<f64>,
}

impl From<&Array2<f64>> for DenseMatrix {
    fn from(m: &Array2<f64>) -> Self {
        let (rows, cols) = m.dim();
        Self {
            rows,
            cols,
            stride: Some(cols),
            data: m.iter().copied().collect(),
        }
    }
}

impl DenseMatrix {
    fn into_array(self, name: &str) -> Result<Array2<f64>> {
        if let Some(stride) = self.stride {
            if stride != self.cols {
                return Err(ClassifierError::snapshot(format!(
                    "{name}: stride {stride} does not match {} columns",
                    self.cols
                )));
            }
        }
        let expected = self.rows.checked_mul(self.cols).ok_or_else(|| {
            ClassifierError::snapshot(format!("{name}: {}x{} overflows", self.rows, self.cols))
        })?;
        if self.data.len() != expected {
            return Err(ClassifierError::snapshot(format!(
                "{name}: {} values for a {}x{} matrix",
                self.data.len(),
                self.rows,
                self.cols
            )));
        }
        Array2::from_shape_vec((self.rows, self.cols), self.data)
            .map_err(|e| ClassifierError::snapshot(format!("{name}: {e}")))
    }
}
