//! Evaluator stage
//!
//! Scores a fitted model against the held-out split and writes the run's
//! metrics record. The model is loaded read-only and never re-fitted.
//! There is no partial or robust scoring: a missing or malformed value
//! anywhere in the test split fails the whole evaluation (only the Splitter
//! cleans rows), an empty test split is rejected rather than reported as 0
//! or 1, and test labels outside the model's class vocabulary are an error,
//! not silent misses.

use serde::{Deserialize, Serialize};

use crate::data::read_dataset_strict;
use crate::error::{Error, Result};
use crate::model::Pipeline;
use crate::run::RunLayout;
use crate::storage::ArtifactStore;

/// Metrics for one run
///
/// Serialized as `metrics.json`; `accuracy` is always in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Fraction of test rows predicted correctly
    pub accuracy: f64,
}

/// Fraction of predictions equal to the true label
pub fn accuracy(predictions: &[String], truth: &[String]) -> Result<f64> {
    if predictions.len() != truth.len() {
        return Err(Error::Precondition(format!(
            "prediction count ({}) does not match label count ({})",
            predictions.len(),
            truth.len()
        )));
    }
    if truth.is_empty() {
        return Err(Error::Precondition(
            "cannot compute accuracy over zero rows".to_string(),
        ));
    }
    let correct = predictions
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Evaluator stage entry point
///
/// Reads the test split and the model artifact, predicts every row with the
/// same four-feature contract used at training time, and writes
/// `metrics.json` under the run directory. Does not decide promotion.
pub fn evaluate(
    store: &dyn ArtifactStore,
    test_csv: &str,
    model_path: &str,
    out_dir: &str,
) -> Result<MetricsRecord> {
    let pipeline = Pipeline::from_bytes(&store.get(model_path)?)?;
    let dataset = read_dataset_strict(store, test_csv)?;
    if dataset.is_empty() {
        return Err(Error::Precondition(format!(
            "test split '{test_csv}' is empty; accuracy would be undefined"
        )));
    }
    for label in dataset.labels() {
        if pipeline.classes.binary_search(label).is_err() {
            return Err(Error::Precondition(format!(
                "test label '{label}' not in model class vocabulary {:?}",
                pipeline.classes
            )));
        }
    }

    let predictions = pipeline.predict(&dataset.feature_matrix())?;
    let record = MetricsRecord {
        accuracy: accuracy(&predictions, dataset.labels())?,
    };

    let layout = RunLayout::new(out_dir);
    store.put(&layout.metrics_json(), &serde_json::to_vec(&record)?)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::model::TrainConfig;
    use crate::storage::InMemoryStore;

    fn fitted_model() -> Pipeline {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            features.push([1.0 + i as f64 * 0.1, 1.0, 1.0, 1.0]);
            labels.push("Adelie".to_string());
            features.push([9.0 + i as f64 * 0.1, 9.0, 9.0, 9.0]);
            labels.push("Gentoo".to_string());
        }
        let ds = Dataset::new(features, labels);
        Pipeline::fit(&ds.feature_matrix(), ds.labels(), &TrainConfig::default()).unwrap()
    }

    fn seed(store: &InMemoryStore, model: &Pipeline, test: &Dataset) {
        store.put("runs/r1/model.json", &model.to_bytes().unwrap()).unwrap();
        store.put("runs/r1/test.csv", &test.to_csv().unwrap()).unwrap();
    }

    #[test]
    fn test_all_correct_yields_accuracy_one() {
        let store = InMemoryStore::new();
        let model = fitted_model();
        let test = Dataset::new(
            vec![[1.2, 1.0, 1.0, 1.0], [9.3, 9.0, 9.0, 9.0]],
            vec!["Adelie".to_string(), "Gentoo".to_string()],
        );
        seed(&store, &model, &test);
        let record =
            evaluate(&store, "runs/r1/test.csv", "runs/r1/model.json", "runs/r1").unwrap();
        assert_eq!(record.accuracy, 1.0);
        assert!(store.exists("runs/r1/metrics.json").unwrap());
    }

    #[test]
    fn test_half_correct_is_exactly_half() {
        let preds = vec!["a".into(), "b".into(), "a".into(), "b".into()];
        let truth = vec!["a".into(), "b".into(), "b".into(), "a".into()];
        assert_eq!(accuracy(&preds, &truth).unwrap(), 0.5);
    }

    #[test]
    fn test_empty_test_split_is_fatal() {
        let store = InMemoryStore::new();
        let model = fitted_model();
        let empty = Dataset::new(Vec::new(), Vec::new());
        seed(&store, &model, &empty);
        match evaluate(&store, "runs/r1/test.csv", "runs/r1/model.json", "runs/r1") {
            Err(Error::Precondition(msg)) => assert!(msg.contains("empty")),
            other => panic!("expected precondition error, got {other:?}"),
        }
        assert!(!store.exists("runs/r1/metrics.json").unwrap());
    }

    #[test]
    fn test_missing_test_values_fail_whole_evaluation() {
        // Rows with NA values must not be scored over a reduced denominator
        let store = InMemoryStore::new();
        let model = fitted_model();
        store.put("runs/r1/model.json", &model.to_bytes().unwrap()).unwrap();
        let test_csv = b"bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,species\n\
            1.2,1.0,1.0,1.0,Adelie\n\
            NA,1.0,1.0,1.0,Adelie\n\
            9.3,9.0,9.0,9.0,Gentoo\n\
            9.3,NaN,9.0,9.0,Gentoo\n";
        store.put("runs/r1/test.csv", test_csv).unwrap();

        match evaluate(&store, "runs/r1/test.csv", "runs/r1/model.json", "runs/r1") {
            Err(Error::Schema(msg)) => assert!(msg.contains("missing")),
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(!store.exists("runs/r1/metrics.json").unwrap());
    }

    #[test]
    fn test_unseen_label_is_fatal() {
        let store = InMemoryStore::new();
        let model = fitted_model();
        let test = Dataset::new(
            vec![[5.0, 5.0, 5.0, 5.0]],
            vec!["Chinstrap".to_string()],
        );
        seed(&store, &model, &test);
        match evaluate(&store, "runs/r1/test.csv", "runs/r1/model.json", "runs/r1") {
            Err(Error::Precondition(msg)) => assert!(msg.contains("Chinstrap")),
            other => panic!("expected precondition error, got {other:?}"),
        }
    }

    #[test]
    fn test_unloadable_model_is_fatal() {
        let store = InMemoryStore::new();
        store.put("runs/r1/model.json", b"not json").unwrap();
        let test = Dataset::new(vec![[1.0, 1.0, 1.0, 1.0]], vec!["Adelie".to_string()]);
        store.put("runs/r1/test.csv", &test.to_csv().unwrap()).unwrap();
        assert!(matches!(
            evaluate(&store, "runs/r1/test.csv", "runs/r1/model.json", "runs/r1"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_accuracy_length_mismatch_rejected() {
        let preds = vec!["a".to_string()];
        let truth = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            accuracy(&preds, &truth),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn test_metrics_record_roundtrip() {
        let record = MetricsRecord { accuracy: 0.9375 };
        let bytes = serde_json::to_vec(&record).unwrap();
        let parsed: MetricsRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, record);
    }
}
