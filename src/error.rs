//! Error taxonomy for the classifier core.
//!
//! Every failure is surfaced to the caller; nothing here is retried or
//! silently recovered. The CLI maps each kind to its own exit status via
//! [`ClassifierError::exit_code`].

use thiserror::Error;

/// Main error type for corpus, training, persistence and classification.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Vocabulary/category build found nothing to index.
    #[error("corpus is empty: no categories with at least one pattern")]
    EmptyCorpus,

    /// Matrix shapes disagree with each other or with the vocabulary/categories.
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// Persisted snapshot is malformed or unreadable.
    #[error("failed to load weight snapshot: {0}")]
    SnapshotLoad(String),

    /// A corpus phrase could not be split into pattern and label.
    #[error("malformed corpus phrase {phrase:?}: {reason}")]
    CorpusParse { phrase: String, reason: &'static str },

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Encoding a snapshot or report failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

impl ClassifierError {
    pub fn dimension(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::SnapshotLoad(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Process exit status the CLI reports for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) => 2,
            Self::EmptyCorpus => 3,
            Self::DimensionMismatch { .. } => 4,
            Self::SnapshotLoad(_) => 5,
            Self::CorpusParse { .. } => 6,
            Self::Serialization(_) | Self::Io(_) => 1,
        }
    }
}
