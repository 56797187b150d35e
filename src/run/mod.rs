//! Run lifecycle: identifiers, directory layout, in-process execution
//!
//! A run owns one store prefix holding five well-known artifacts: the two
//! split files, the model, its metadata sidecar, and the metrics record.
//! [`RunLayout`] is the single place that knows those names; the production
//! slot reuses the model/meta/metrics names so promotion is a straight copy.
//!
//! [`run_pipeline`] executes the four stages in DAG order against one store.
//! It exists for local use and tests; an external orchestrator invokes the
//! stages individually through the CLI and owns retries and scheduling.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::eval::evaluate;
use crate::promote::{promote, PromotionRecord};
use crate::split::{split, SplitSummary};
use crate::storage::{join, ArtifactStore};
use crate::train::train;

/// Train split file name
pub const TRAIN_FILE: &str = "train.csv";
/// Test split file name
pub const TEST_FILE: &str = "test.csv";
/// Model artifact file name
pub const MODEL_FILE: &str = "model.json";
/// Model metadata sidecar file name
pub const MODEL_META_FILE: &str = "model_meta.json";
/// Metrics record file name
pub const METRICS_FILE: &str = "metrics.json";
/// Promotion record file name
pub const PROMOTION_FILE: &str = "promotion.json";

/// Identifier for one pipeline execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Wrap a caller-supplied run id
    ///
    /// Ids become path segments, so they must be non-empty and `/`-free.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.contains('/') {
            return Err(Error::Config(format!(
                "run id must be non-empty and contain no '/': '{id}'"
            )));
        }
        Ok(Self(id))
    }

    /// Generate a timestamped run id
    pub fn generate() -> Self {
        Self(format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S%3f")))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known artifact paths under one run (or slot) directory
#[derive(Debug, Clone)]
pub struct RunLayout {
    dir: String,
}

impl RunLayout {
    /// Layout rooted at a run or production-slot directory
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory prefix itself
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Path of the train split
    pub fn train_csv(&self) -> String {
        join(&self.dir, TRAIN_FILE)
    }

    /// Path of the test split
    pub fn test_csv(&self) -> String {
        join(&self.dir, TEST_FILE)
    }

    /// Path of the model artifact
    pub fn model_json(&self) -> String {
        join(&self.dir, MODEL_FILE)
    }

    /// Path of the model metadata sidecar
    pub fn model_meta_json(&self) -> String {
        join(&self.dir, MODEL_META_FILE)
    }

    /// Path of the metrics record
    pub fn metrics_json(&self) -> String {
        join(&self.dir, METRICS_FILE)
    }

    /// Path of the promotion record
    pub fn promotion_json(&self) -> String {
        join(&self.dir, PROMOTION_FILE)
    }
}

/// Outcome of a full in-process pipeline execution
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Run directory the stages wrote to
    pub run_dir: String,
    /// Split row counts
    pub split: SplitSummary,
    /// Accuracy on the held-out split
    pub accuracy: f64,
    /// What the promoter did
    pub promotion: PromotionRecord,
}

/// Execute split → train → evaluate → promote for one run
///
/// Stages run strictly in order; the first failure aborts the run and
/// propagates. Only the promoter writes outside `run_dir`.
pub fn run_pipeline(
    store: &dyn ArtifactStore,
    input_csv: &str,
    run_dir: &str,
    slot_dir: &str,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    config.validate()?;
    let layout = RunLayout::new(run_dir);

    let summary = split(store, input_csv, run_dir, &config.split)?;
    train(store, &layout.train_csv(), run_dir, &config.train)?;
    let metrics = evaluate(store, &layout.test_csv(), &layout.model_json(), run_dir)?;
    let promotion = promote(
        store,
        run_dir,
        slot_dir,
        config.policy.policy().as_ref(),
    )?;

    Ok(PipelineReport {
        run_dir: run_dir.to_string(),
        split: summary,
        accuracy: metrics.accuracy,
        promotion,
    })
}
