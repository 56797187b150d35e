//! Splitter stage: deterministic stratified train/test partition
//!
//! Partitions the cleaned dataset 80/20 by default, stratified on the label
//! so each class lands in both partitions in proportion to its frequency
//! (subject to integer rounding). A fixed seed drives the shuffle, so the
//! same input bytes always produce the same partition, row for row — the
//! evaluation downstream is only reproducible because of this.
//!
//! Classes with fewer than 2 members are rejected as a precondition: one row
//! cannot appear in both partitions, and dropping it silently would hide
//! data loss the caller did not ask for.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::{read_dataset, write_dataset, Dataset};
use crate::error::{Error, Result};
use crate::run::RunLayout;
use crate::storage::ArtifactStore;

/// Splitter configuration
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows assigned to the test partition, in (0, 1)
    pub test_fraction: f64,
    /// Seed for the stratified shuffle
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Row counts written by a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    /// Rows in the train partition
    pub train_rows: usize,
    /// Rows in the test partition
    pub test_rows: usize,
}

/// Compute stratified train/test row indices
///
/// Returned index vectors are sorted ascending, so selecting them preserves
/// the source row order inside each partition.
pub fn stratified_indices(
    dataset: &Dataset,
    config: &SplitConfig,
) -> Result<(Vec<usize>, Vec<usize>)> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(Error::Precondition(
            "cannot split an empty dataset".to_string(),
        ));
    }

    // BTreeMap keeps class iteration order independent of row order quirks
    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in dataset.labels().iter().enumerate() {
        by_class.entry(label.as_str()).or_default().push(i);
    }

    for (class, members) in &by_class {
        if members.len() < 2 {
            return Err(Error::Precondition(format!(
                "class '{class}' has {} member(s); stratified split needs at least 2 per class",
                members.len()
            )));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for members in by_class.values() {
        let mut shuffled = members.clone();
        shuffled.shuffle(&mut rng);
        let n = shuffled.len();
        let n_test = ((n as f64 * config.test_fraction).round() as usize).clamp(1, n - 1);
        test.extend_from_slice(&shuffled[..n_test]);
        train.extend_from_slice(&shuffled[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Split a dataset in memory
pub fn stratified_split(dataset: &Dataset, config: &SplitConfig) -> Result<(Dataset, Dataset)> {
    let (train_idx, test_idx) = stratified_indices(dataset, config)?;
    Ok((dataset.select(&train_idx), dataset.select(&test_idx)))
}

/// Splitter stage entry point
///
/// Reads the raw dataset at `input_csv`, validates its schema, drops rows
/// with missing values, and writes `train.csv` / `test.csv` under the run
/// directory. Fatal if the input is unreadable or the schema is wrong.
pub fn split(
    store: &dyn ArtifactStore,
    input_csv: &str,
    out_dir: &str,
    config: &SplitConfig,
) -> Result<SplitSummary> {
    let dataset = read_dataset(store, input_csv)?;
    let (train, test) = stratified_split(&dataset, config)?;
    let layout = RunLayout::new(out_dir);
    write_dataset(store, &layout.train_csv(), &train)?;
    write_dataset(store, &layout.test_csv(), &test)?;
    Ok(SplitSummary {
        train_rows: train.len(),
        test_rows: test.len(),
    })
}
