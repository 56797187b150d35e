//! Trainer stage
//!
//! Fits the scaler+classifier pipeline on the train split and persists two
//! artifacts under the run directory: the opaque model (`model.json`) and
//! the metadata sidecar (`model_meta.json`) carrying the class vocabulary.
//! Scaling statistics come from the train split only; the test split is
//! never read here.

use crate::data::read_dataset;
use crate::error::{Error, Result};
use crate::model::{ModelMeta, Pipeline, TrainConfig};
use crate::run::RunLayout;
use crate::storage::ArtifactStore;

/// Trainer stage entry point
///
/// Fatal if the train split is missing, empty, or has fewer than 2 distinct
/// classes. Returns the fitted pipeline for callers that keep going in
/// process.
pub fn train(
    store: &dyn ArtifactStore,
    train_csv: &str,
    out_dir: &str,
    config: &TrainConfig,
) -> Result<Pipeline> {
    let dataset = read_dataset(store, train_csv)?;
    if dataset.is_empty() {
        return Err(Error::Precondition(format!(
            "train split '{train_csv}' has no usable rows"
        )));
    }

    let pipeline = Pipeline::fit(&dataset.feature_matrix(), dataset.labels(), config)?;

    let layout = RunLayout::new(out_dir);
    store.put(&layout.model_json(), &pipeline.to_bytes()?)?;
    let meta = ModelMeta {
        classes: pipeline.classes.clone(),
    };
    store.put(&layout.model_meta_json(), &serde_json::to_vec(&meta)?)?;
    Ok(pipeline)
}
