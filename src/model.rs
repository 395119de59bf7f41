//! Intent network: bag-of-words [1,V] -> sigmoid hidden [1,H] -> sigmoid output [1,C]
//!
//! - V input features (one per vocabulary word, 0/1)
//! - H hidden units (configurable, 20 by default), no biases
//! - C outputs, one independent sigmoid per category
//!
//! Training is plain full-batch gradient descent on the squared error, with
//! an error checkpoint every 10 000 epochs past epoch 5 000 that stops the
//! run as soon as the error fails to improve.

use std::time::Instant;

use ndarray::{s, Array1, Array2, Axis, Ix2};
use rand::distributions::OpenClosed01;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TrainConfig;
use crate::error::{ClassifierError, Result};
use crate::features::TrainingSet;
use crate::snapshot::WeightSnapshot;

/// Epochs between error checkpoints.
pub const CHECKPOINT_INTERVAL: usize = 10_000;

/// Checkpoints only fire strictly after this epoch.
pub const CHECKPOINT_WARMUP: usize = 5_000;

/// Best-error baseline the first checkpoint must beat.
const INITIAL_BEST_ERROR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// Logistic function `1 / (1 + e^-z)`.
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn sigmoid_matrix(m: Array2<f64>) -> Array2<f64> {
    m.mapv_into(sigmoid)
}

/// Derivative of the sigmoid expressed through its output: `a * (1 - a)`.
fn sigmoid_slope(activations: &Array2<f64>) -> Array2<f64> {
    activations.mapv(|a| a * (1.0 - a))
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// The two weight matrices: `w0` is V x H, `w1` is H x C.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    w0: Array2<f64>,
    w1: Array2<f64>,
}

impl Network {
    /// Every weight drawn independently from U[-1, 1).
    pub fn random<R: Rng>(inputs: usize, hidden: usize, outputs: usize, rng: &mut R) -> Self {
        let w0 = Array2::from_shape_fn((inputs, hidden), |_| rng.gen_range(-1.0..1.0));
        let w1 = Array2::from_shape_fn((hidden, outputs), |_| rng.gen_range(-1.0..1.0));
        Self { w0, w1 }
    }

    /// Wrap existing weights; the hidden dimensions must agree.
    pub fn from_weights(w0: Array2<f64>, w1: Array2<f64>) -> Result<Self> {
        if w0.ncols() != w1.nrows() {
            return Err(ClassifierError::dimension(
                "hidden layer width",
                w0.ncols(),
                w1.nrows(),
            ));
        }
        Ok(Self { w0, w1 })
    }

    pub fn input_size(&self) -> usize {
        self.w0.nrows()
    }

    pub fn hidden_size(&self) -> usize {
        self.w0.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.w1.ncols()
    }

    pub fn w0(&self) -> &Array2<f64> {
        &self.w0
    }

    pub fn w1(&self) -> &Array2<f64> {
        &self.w1
    }

    /// Forward pass over a batch. Returns `(hidden, output)`.
    pub fn infer(&self, x: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        if x.ncols() != self.input_size() {
            return Err(ClassifierError::dimension(
                "input features",
                self.input_size(),
                x.ncols(),
            ));
        }
        let hidden = sigmoid_matrix(x.dot(&self.w0));
        let output = sigmoid_matrix(hidden.dot(&self.w1));
        Ok((hidden, output))
    }

    /// Forward pass for a single feature vector; returns the output layer.
    pub fn infer_one(&self, features: &Array1<f64>) -> Result<Array1<f64>> {
        let x = features.clone().insert_axis(Axis(0));
        let (_, output) = self.infer(&x)?;
        Ok(output.row(0).to_owned())
    }
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    /// Epochs whose weight update was applied.
    pub epochs_run: usize,
    pub stopped_early: bool,
    /// Lowest checkpoint error recorded, if any checkpoint fired.
    pub best_mean_error: Option<f64>,
    /// Weight-update sign flips between consecutive epochs.
    pub direction_changes_w0: u64,
    pub direction_changes_w1: u64,
}

/// Train a fresh network on `set` and bundle it with the set's vocabulary
/// and categories.
pub fn train<R: Rng>(
    set: &TrainingSet,
    cfg: &TrainConfig,
    rng: &mut R,
) -> Result<(WeightSnapshot, TrainReport)> {
    cfg.validate()?;
    set.validate()?;

    let x = &set.features;
    let y = &set.labels;
    info!(
        hidden = cfg.hidden_size,
        learning_rate = cfg.learning_rate,
        dropout = cfg.dropout,
        "training"
    );
    info!(
        input = ?x.dim(),
        output = ?y.dim(),
        max_epochs = cfg.max_epochs,
        "matrix shapes"
    );

    let start = Instant::now();
    let mut network = Network::random(x.ncols(), cfg.hidden_size, y.ncols(), rng);
    let mut best_error = INITIAL_BEST_ERROR;
    let mut report = TrainReport {
        epochs_run: 0,
        stopped_early: false,
        best_mean_error: None,
        direction_changes_w0: 0,
        direction_changes_w1: 0,
    };
    let mut previous_grads: Option<(Array2<f64>, Array2<f64>)> = None;

    for epoch in 0..=cfg.max_epochs {
        let mut hidden = sigmoid_matrix(x.dot(&network.w0));
        if cfg.dropout {
            let mask = dropout_mask(hidden.raw_dim(), rng);
            hidden *= &mask;
        }
        let output = sigmoid_matrix(hidden.dot(&network.w1));

        let output_error = y - &output;

        if epoch % CHECKPOINT_INTERVAL == 0 && epoch > CHECKPOINT_WARMUP {
            let mean_error = boundary_mean_abs(&output_error);
            if mean_error < best_error {
                info!(epoch, mean_error, "checkpoint: error improved");
                best_error = mean_error;
                report.best_mean_error = Some(mean_error);
            } else {
                info!(
                    epoch,
                    mean_error,
                    best_error,
                    "checkpoint: error stopped improving, stopping early"
                );
                report.stopped_early = true;
                break;
            }
        }

        let output_delta = &output_error * &sigmoid_slope(&output);
        let hidden_error = output_delta.dot(&network.w1.t());
        let hidden_delta = hidden_error * &sigmoid_slope(&hidden);

        let grad_w1 = hidden.t().dot(&output_delta);
        let grad_w0 = x.t().dot(&hidden_delta);

        if let Some((prev_w0, prev_w1)) = &previous_grads {
            report.direction_changes_w0 += count_direction_changes(&grad_w0, prev_w0);
            report.direction_changes_w1 += count_direction_changes(&grad_w1, prev_w1);
        }

        network.w1.scaled_add(cfg.learning_rate, &grad_w1);
        network.w0.scaled_add(cfg.learning_rate, &grad_w0);
        previous_grads = Some((grad_w0, grad_w1));
        report.epochs_run += 1;
    }

    info!(
        epochs = report.epochs_run,
        stopped_early = report.stopped_early,
        elapsed_secs = start.elapsed().as_secs_f64(),
        direction_changes_w0 = report.direction_changes_w0,
        direction_changes_w1 = report.direction_changes_w1,
        "training complete"
    );

    let snapshot =
        WeightSnapshot::new(network, set.vocabulary.clone(), set.categories.clone())?;
    Ok((snapshot, report))
}

/// Hidden-layer mask for training-time dropout.
///
/// Each entry is `r / r` for a fresh `r` in (0, 1], which is always 1.0: the
/// mask keeps every unit.
fn dropout_mask<R: Rng>(shape: Ix2, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_fn(shape, |_| {
        let r: f64 = rng.sample(OpenClosed01);
        r / r
    })
}

/// Mean absolute error over all rows but the last and all columns but the
/// last, divided by the full element count.
fn boundary_mean_abs(error: &Array2<f64>) -> f64 {
    let (rows, cols) = error.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    let total = error
        .slice(s![..rows - 1, ..cols - 1])
        .iter()
        .fold(0.0, |acc, v| acc + v.abs());
    let mean = total / (rows * cols) as f64;
    debug!(rows, cols, mean, "boundary mean abs error");
    mean
}

/// Entries whose update sign (positive vs not) differs between two epochs.
fn count_direction_changes(current: &Array2<f64>, previous: &Array2<f64>) -> u64 {
    current
        .iter()
        .zip(previous.iter())
        .filter(|&(&c, &p)| (c > 0.0) != (p > 0.0))
        .count() as u64
}
