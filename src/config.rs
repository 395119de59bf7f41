//! Engine configuration.
//!
//! Defaults reproduce the reference chatbot: 20 hidden units, learning rate
//! 0.1, 100 000 epochs, dropout off, confidence threshold 0.2. Every field is
//! optional in a TOML file; CLI flags override file values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

/// Minimum output activation for a category to be reported.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.2;

/// Full engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub train: TrainConfig,
    pub classify: ClassifyConfig,
}

/// Training hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Width of the hidden layer
    pub hidden_size: usize,

    /// Gradient descent step size
    pub learning_rate: f64,

    /// Last epoch index; the loop runs `max_epochs + 1` iterations.
    pub max_epochs: usize,

    /// Apply the hidden-layer mask during training.
    pub dropout: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            hidden_size: 20,
            learning_rate: 0.1,
            max_epochs: 100_000,
            dropout: false,
        }
    }
}

/// Inference settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub confidence_threshold: f64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 {
            return Err(ClassifierError::config("hidden_size must be positive"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ClassifierError::config(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl ClassifyConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ClassifierError::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Parse a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ClassifierError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.train.validate()?;
        self.classify.validate()
    }
}
