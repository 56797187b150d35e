//! Scaler + classifier model family
//!
//! One fixed model family: standardize the four features, then a one-vs-rest
//! logistic classifier. The fitted scaler and classifier are bundled into a
//! single [`Pipeline`] artifact so inference needs no separate scaling step,
//! and the class vocabulary observed at fit time travels with the model.
//!
//! The solver is batch gradient descent from zero-initialized weights, so
//! fitting is fully deterministic; the configured seed is recorded in the
//! artifact for provenance.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::data::NUM_FEATURES;
use crate::error::{Error, Result};

/// Solver configuration for the classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Maximum gradient-descent iterations per class
    pub max_iter: usize,
    /// Gradient-descent step size
    pub learning_rate: f64,
    /// Seed for any stochastic aspect of optimization
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            learning_rate: 0.1,
            seed: 42,
        }
    }
}

impl TrainConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::Config("max_iter must be at least 1".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Per-feature standardization to zero mean and unit variance
///
/// Statistics come from the train split only; the fitted parameters are what
/// the no-leakage property in the tests checks against externally computed
/// train statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean
    pub mean: Array1<f64>,
    /// Per-feature standard deviation (population)
    pub std: Array1<f64>,
}

impl StandardScaler {
    /// Fit scaling parameters from a feature matrix
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(Error::Precondition(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        let mean = x.mean_axis(Axis(0)).expect("non-empty matrix");
        let n = x.nrows() as f64;
        let mut std = Array1::zeros(x.ncols());
        for j in 0..x.ncols() {
            let var = x.column(j).iter().map(|v| (v - mean[j]).powi(2)).sum::<f64>() / n;
            let s = var.sqrt();
            // A constant column carries no signal; scale by 1 instead of 0
            std[j] = if s > 0.0 { s } else { 1.0 };
        }
        Ok(Self { mean, std })
    }

    /// Standardize a feature matrix
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for j in 0..out.ncols() {
            let (m, s) = (self.mean[j], self.std[j]);
            out.column_mut(j).mapv_inplace(|v| (v - m) / s);
        }
        out
    }
}

/// One-vs-rest multinomial logistic classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Weight matrix, one row per class
    pub weights: Array2<f64>,
    /// Per-class intercept
    pub bias: Array1<f64>,
}

impl LogisticRegression {
    /// Fit one binary logistic regression per class against the rest
    ///
    /// `targets[i]` must be a class index into the caller's vocabulary of
    /// `n_classes` labels.
    pub fn fit(
        x: &Array2<f64>,
        targets: &[usize],
        n_classes: usize,
        config: &TrainConfig,
    ) -> Result<Self> {
        config.validate()?;
        if n_classes < 2 {
            return Err(Error::Precondition(format!(
                "classifier needs at least 2 classes, got {n_classes}"
            )));
        }
        if x.nrows() != targets.len() || x.nrows() == 0 {
            return Err(Error::Precondition(format!(
                "feature rows ({}) and targets ({}) must match and be non-empty",
                x.nrows(),
                targets.len()
            )));
        }

        let n = x.nrows() as f64;
        let mut weights = Array2::zeros((n_classes, x.ncols()));
        let mut bias = Array1::zeros(n_classes);
        for class in 0..n_classes {
            let t: Array1<f64> = targets
                .iter()
                .map(|&c| if c == class { 1.0 } else { 0.0 })
                .collect();
            let mut w: Array1<f64> = Array1::zeros(x.ncols());
            let mut b = 0.0f64;
            for _ in 0..config.max_iter {
                let z = x.dot(&w) + b;
                let err = z.mapv(sigmoid) - &t;
                let grad_w = x.t().dot(&err) / n;
                let grad_b = err.sum() / n;
                w = w - grad_w * config.learning_rate;
                b -= config.learning_rate * grad_b;
            }
            weights.row_mut(class).assign(&w);
            bias[class] = b;
        }
        Ok(Self { weights, bias })
    }

    /// Raw per-class decision scores, shape `(n_rows, n_classes)`
    pub fn decision_scores(&self, x: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.weights.t()) + &self.bias
    }

    /// Predicted class index per row (argmax of decision scores)
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        let scores = self.decision_scores(x);
        scores
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = j;
                    }
                }
                best
            })
            .collect()
    }
}

/// The fitted model artifact: scaler, classifier, and class vocabulary
///
/// Serialized as one JSON blob (`model.json`); consumers treat it as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Fitted feature scaler
    pub scaler: StandardScaler,
    /// Fitted classifier
    pub classifier: LogisticRegression,
    /// Sorted, de-duplicated label classes seen at fit time
    pub classes: Vec<String>,
    /// Solver configuration the model was fitted with
    pub config: TrainConfig,
}

impl Pipeline {
    /// Fit the scaler and classifier on training features and labels
    pub fn fit(x: &Array2<f64>, labels: &[String], config: &TrainConfig) -> Result<Self> {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(Error::Precondition(format!(
                "train split has {} distinct class(es); need at least 2",
                classes.len()
            )));
        }

        let targets: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).expect("label drawn from classes"))
            .collect();

        let scaler = StandardScaler::fit(x)?;
        let scaled = scaler.transform(x);
        let classifier = LogisticRegression::fit(&scaled, &targets, classes.len(), config)?;
        Ok(Self {
            scaler,
            classifier,
            classes,
            config: *config,
        })
    }

    /// Predict a class label for every feature row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        if x.ncols() != NUM_FEATURES {
            return Err(Error::Precondition(format!(
                "expected {NUM_FEATURES} feature columns, got {}",
                x.ncols()
            )));
        }
        let scaled = self.scaler.transform(x);
        Ok(self
            .classifier
            .predict(&scaled)
            .into_iter()
            .map(|c| self.classes[c].clone())
            .collect())
    }

    /// Serialize the artifact to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize an artifact from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Sidecar metadata: the authoritative class vocabulary for a run
///
/// Serving consumers map raw predictions back through this list; labels
/// outside it are an error, never coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Sorted, de-duplicated label classes
    pub classes: Vec<String>,
}
