//! Promover: deterministic split/train/evaluate/promote pipeline
//!
//! Trains a multi-class classifier from a small tabular dataset, evaluates
//! it against a held-out split, and conditionally promotes the run's
//! artifacts into a stable production slot that a serving process reads.
//!
//! The pipeline is four pure stages over a path-addressed artifact store:
//!
//! ```text
//! split ──> train ──> evaluate ──> promote
//! ```
//!
//! Each stage reads only its predecessor's artifacts (or the raw dataset)
//! and writes only to its own run directory; the promoter alone writes to
//! the shared production slot.
//!
//! # Example
//!
//! ```
//! use promover::config::PipelineConfig;
//! use promover::data::Dataset;
//! use promover::run::run_pipeline;
//! use promover::storage::{ArtifactStore, InMemoryStore};
//!
//! # fn main() -> promover::Result<()> {
//! let store = InMemoryStore::new();
//! let mut features = Vec::new();
//! let mut labels = Vec::new();
//! for i in 0..20 {
//!     features.push([1.0 + i as f64 * 0.05, 1.0, 1.0, 1.0]);
//!     labels.push("Adelie".to_string());
//!     features.push([9.0 + i as f64 * 0.05, 9.0, 9.0, 9.0]);
//!     labels.push("Gentoo".to_string());
//! }
//! let dataset = Dataset::new(features, labels);
//! store.put("data/penguins.csv", &dataset.to_csv()?)?;
//!
//! let report = run_pipeline(
//!     &store,
//!     "data/penguins.csv",
//!     "runs/run-1",
//!     "models",
//!     &PipelineConfig::default(),
//! )?;
//! assert!(report.promotion.promoted);
//! assert!(store.exists("models/model.json")?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod model;
pub mod promote;
pub mod run;
pub mod split;
pub mod storage;
pub mod train;

pub use error::{Error, Result};
