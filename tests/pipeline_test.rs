//! End-to-end pipeline tests over a real filesystem store

use promover::config::PipelineConfig;
use promover::data::Dataset;
use promover::error::Error;
use promover::eval::{evaluate, MetricsRecord};
use promover::model::{LogisticRegression, ModelMeta, Pipeline, StandardScaler, TrainConfig};
use promover::promote::{promote, AlwaysPromote, PromoteError};
use promover::run::{run_pipeline, RunLayout};
use promover::storage::{ArtifactStore, InMemoryStore, LocalStore, StorageError};

use ndarray::{Array1, Array2};

const CLASSES: [&str; 3] = ["Adelie", "Chinstrap", "Gentoo"];

/// 3 balanced, well-separated classes, `per_class` rows each
fn balanced_dataset(per_class: usize) -> Dataset {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (c, class) in CLASSES.iter().enumerate() {
        for i in 0..per_class {
            let base = 10.0 * c as f64;
            let jitter = (i % 7) as f64 * 0.1;
            features.push([
                base + jitter,
                base + 1.0 + jitter,
                base + 2.0 - jitter,
                base + 3.0 + jitter,
            ]);
            labels.push(class.to_string());
        }
    }
    Dataset::new(features, labels)
}

fn seed_input(store: &dyn ArtifactStore, path: &str, dataset: &Dataset) {
    store
        .put(path, &dataset.to_csv().expect("serialize dataset"))
        .expect("seed input dataset");
}

#[test]
fn test_end_to_end_scenario() {
    // 300 rows, 3 balanced classes, seed 42, fraction 0.2
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_str().expect("utf8 path");
    let store = LocalStore::new();
    let input = format!("{root}/data/penguins.csv");
    seed_input(&store, &input, &balanced_dataset(100));

    let run_dir = format!("{root}/runs/run-1");
    let slot_dir = format!("{root}/models");
    let report = run_pipeline(
        &store,
        &input,
        &run_dir,
        &slot_dir,
        &PipelineConfig::default(),
    )
    .expect("pipeline should complete");

    // 20 test rows per class
    assert_eq!(report.split.test_rows, 60);
    assert_eq!(report.split.train_rows, 240);
    let test = Dataset::from_csv(
        &store
            .get(&RunLayout::new(&run_dir).test_csv())
            .expect("test split exists"),
    )
    .expect("test split parses");
    for class in CLASSES {
        let count = test.labels().iter().filter(|l| *l == class).count();
        assert_eq!(count, 20, "class {class}");
    }

    // Metadata class list is exactly the 3 labels, sorted
    let meta: ModelMeta = serde_json::from_slice(
        &store
            .get(&RunLayout::new(&run_dir).model_meta_json())
            .expect("meta exists"),
    )
    .expect("meta parses");
    assert_eq!(meta.classes, CLASSES);

    // Separable clusters: the model should classify the held-out split
    assert!((0.9..=1.0).contains(&report.accuracy), "accuracy {}", report.accuracy);

    // Default policy promoted the run into the slot
    assert!(report.promotion.promoted);
    let slot = RunLayout::new(&slot_dir);
    assert_eq!(
        store.get(&slot.model_json()).expect("slot model"),
        store.get(&RunLayout::new(&run_dir).model_json()).expect("run model"),
    );
    let slot_metrics: MetricsRecord =
        serde_json::from_slice(&store.get(&slot.metrics_json()).expect("slot metrics"))
            .expect("slot metrics parse");
    assert_eq!(slot_metrics.accuracy, report.accuracy);
}

#[test]
fn test_split_byte_identical_between_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_str().expect("utf8 path");
    let store = LocalStore::new();
    let input = format!("{root}/data/penguins.csv");
    seed_input(&store, &input, &balanced_dataset(50));

    let config = PipelineConfig::default();
    for run in ["a", "b"] {
        promover::split::split(
            &store,
            &input,
            &format!("{root}/runs/{run}"),
            &config.split,
        )
        .expect("split");
    }
    assert_eq!(
        store.get(&format!("{root}/runs/a/train.csv")).expect("a train"),
        store.get(&format!("{root}/runs/b/train.csv")).expect("b train"),
    );
    assert_eq!(
        store.get(&format!("{root}/runs/a/test.csv")).expect("a test"),
        store.get(&format!("{root}/runs/b/test.csv")).expect("b test"),
    );
}

#[test]
fn test_scaler_uses_train_statistics_only() {
    let store = InMemoryStore::new();
    let input = "data/penguins.csv";
    seed_input(&store, input, &balanced_dataset(40));

    let config = PipelineConfig::default();
    run_pipeline(&store, input, "runs/a", "models", &config).expect("run a");

    // Recompute mean/variance from the train split alone
    let layout = RunLayout::new("runs/a");
    let train = Dataset::from_csv(&store.get(&layout.train_csv()).expect("train split"))
        .expect("train parses");
    let x = train.feature_matrix();
    let n = x.nrows() as f64;

    let model = Pipeline::from_bytes(&store.get(&layout.model_json()).expect("model"))
        .expect("model parses");
    for j in 0..x.ncols() {
        let mean: f64 = x.column(j).sum() / n;
        let var: f64 = x.column(j).iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(
            (model.scaler.mean[j] - mean).abs() < 1e-12,
            "column {j} mean"
        );
        assert!(
            (model.scaler.std[j] - var.sqrt()).abs() < 1e-12,
            "column {j} std"
        );
    }
}

#[test]
fn test_promotion_overwrite_law() {
    // After promoting run A then run B, the slot carries exactly B
    let store = InMemoryStore::new();
    let input = "data/penguins.csv";
    seed_input(&store, input, &balanced_dataset(40));

    let config = PipelineConfig::default();
    run_pipeline(&store, input, "runs/a", "models", &config).expect("run a");

    // Run B trains on a slightly different dataset so its artifacts differ
    seed_input(&store, input, &balanced_dataset(45));
    run_pipeline(&store, input, "runs/b", "models", &config).expect("run b");

    let slot = RunLayout::new("models");
    let run_b = RunLayout::new("runs/b");
    assert_eq!(
        store.get(&slot.model_json()).expect("slot model"),
        store.get(&run_b.model_json()).expect("b model"),
    );
    assert_eq!(
        store.get(&slot.model_meta_json()).expect("slot meta"),
        store.get(&run_b.model_meta_json()).expect("b meta"),
    );
    assert_eq!(
        store.get(&slot.metrics_json()).expect("slot metrics"),
        store.get(&run_b.metrics_json()).expect("b metrics"),
    );
}

/// A constant model: zero weights everywhere except a bias favoring one class
fn majority_class_model() -> Pipeline {
    let classes: Vec<String> = CLASSES.iter().map(|c| c.to_string()).collect();
    let mut bias = Array1::zeros(classes.len());
    bias[0] = 1.0; // always "Adelie"
    Pipeline {
        scaler: StandardScaler {
            mean: Array1::zeros(4),
            std: Array1::ones(4),
        },
        classifier: LogisticRegression {
            weights: Array2::zeros((classes.len(), 4)),
            bias,
        },
        classes,
        config: TrainConfig::default(),
    }
}

#[test]
fn test_majority_class_model_scores_one_third() {
    let store = InMemoryStore::new();
    let test = balanced_dataset(20);
    store
        .put("runs/r/test.csv", &test.to_csv().expect("csv"))
        .expect("seed test split");
    store
        .put(
            "runs/r/model.json",
            &majority_class_model().to_bytes().expect("model bytes"),
        )
        .expect("seed model");

    let record = evaluate(&store, "runs/r/test.csv", "runs/r/model.json", "runs/r")
        .expect("evaluation should succeed");
    assert!(
        (record.accuracy - 1.0 / 3.0).abs() < 1e-12,
        "accuracy {}",
        record.accuracy
    );
}

/// Store wrapper that fails writes to one path, for partial-copy tests
struct FailingPut<'a> {
    inner: &'a InMemoryStore,
    poisoned: &'a str,
}

impl ArtifactStore for FailingPut<'_> {
    fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.get(path)
    }

    fn put(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        if path == self.poisoned {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(path, data)
    }

    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        self.inner.exists(path)
    }
}

#[test]
fn test_partial_copy_reported_as_inconsistent() {
    let store = InMemoryStore::new();
    let input = "data/penguins.csv";
    seed_input(&store, input, &balanced_dataset(30));
    run_pipeline(&store, input, "runs/a", "models", &PipelineConfig::default())
        .expect("run a");

    // Second copy (model_meta.json) fails after model.json succeeded
    let flaky = FailingPut {
        inner: &store,
        poisoned: "models/model_meta.json",
    };
    let run_b_dir = "runs/a"; // re-promote the same run through the flaky store
    match promote(&flaky, run_b_dir, "models", &AlwaysPromote) {
        Err(Error::Promotion(PromoteError::Inconsistent { copied, .. })) => {
            assert_eq!(copied, vec!["model.json".to_string()]);
        }
        other => panic!("expected Inconsistent, got {other:?}"),
    }
}

#[test]
fn test_unsupported_scheme_rejected_by_cli_layer() {
    use promover::storage::local_path;
    assert!(local_path("gs://bucket/runs").is_err());
    assert!(local_path("file:///tmp/runs").is_ok());
}
