//! Tabular dataset loading and schema validation
//!
//! The pipeline assumes one fixed schema: four continuous features plus one
//! categorical label. CSV files may carry extra columns, which are ignored;
//! the five required columns must be present or loading fails with a schema
//! error.
//!
//! Missing values have two behaviors, per the stage contracts: the lenient
//! parse drops affected rows in input order (the Splitter's cleaning step,
//! so the cleaned frame is a deterministic function of the input bytes),
//! while the strict parse treats any missing value as a schema error (the
//! Evaluator, which never scores over a silently reduced denominator). A
//! present-but-unparsable feature value is a schema error in both modes;
//! missingness is decided for the whole row before any value is parsed, so
//! a row cannot flip between "dropped" and "fatal" based on column order.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::storage::ArtifactStore;

/// Number of feature columns
pub const NUM_FEATURES: usize = 4;

/// Required feature columns, in canonical order
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    "bill_length_mm",
    "bill_depth_mm",
    "flipper_length_mm",
    "body_mass_g",
];

/// Required label column
pub const LABEL_COLUMN: &str = "species";

/// Field values treated as missing, matching common CSV NA spellings
fn is_missing(field: &str) -> bool {
    let f = field.trim();
    f.is_empty() || f.eq_ignore_ascii_case("na") || f.eq_ignore_ascii_case("nan") || f.eq_ignore_ascii_case("null")
}

/// What to do with rows missing a required value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingRows {
    /// Drop the row (Splitter cleaning)
    Drop,
    /// Fail the whole parse (Evaluator input)
    Fail,
}

/// An in-memory labeled frame with the pipeline's fixed schema
///
/// Row order is preserved from the source CSV; every accessor and the CSV
/// writer iterate in that order, which is what makes split output
/// byte-reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<[f64; NUM_FEATURES]>,
    labels: Vec<String>,
}

impl Dataset {
    /// Build a dataset from parallel feature and label vectors
    pub fn new(features: Vec<[f64; NUM_FEATURES]>, labels: Vec<String>) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self { features, labels }
    }

    /// Parse CSV bytes, validating the schema and dropping rows with
    /// missing values in the required columns
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        Self::parse_csv(bytes, MissingRows::Drop)
    }

    /// Parse CSV bytes, validating the schema; any missing value in a
    /// required column is a schema error
    pub fn from_csv_strict(bytes: &[u8]) -> Result<Self> {
        Self::parse_csv(bytes, MissingRows::Fail)
    }

    fn parse_csv(bytes: &[u8], policy: MissingRows) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|e| Error::Schema(format!("unreadable CSV header: {e}")))?
            .clone();

        let mut column_indices = [0usize; NUM_FEATURES];
        let mut missing_columns = Vec::new();
        for (i, name) in FEATURE_COLUMNS.iter().enumerate() {
            match headers.iter().position(|h| h == *name) {
                Some(idx) => column_indices[i] = idx,
                None => missing_columns.push(*name),
            }
        }
        let label_index = headers.iter().position(|h| h == LABEL_COLUMN);
        if label_index.is_none() {
            missing_columns.push(LABEL_COLUMN);
        }
        if !missing_columns.is_empty() {
            return Err(Error::Schema(format!(
                "missing required columns: {}",
                missing_columns.join(", ")
            )));
        }
        let label_index = label_index.expect("checked above");

        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (row_number, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| Error::Schema(format!("row {}: {e}", row_number + 1)))?;

            // Phase one: missingness across every required field
            let label = record.get(label_index).unwrap_or("");
            let mut fields = [""; NUM_FEATURES];
            let mut missing = is_missing(label);
            for (i, &col) in column_indices.iter().enumerate() {
                fields[i] = record.get(col).unwrap_or("");
                if is_missing(fields[i]) {
                    missing = true;
                }
            }
            if missing {
                match policy {
                    MissingRows::Drop => continue,
                    MissingRows::Fail => {
                        return Err(Error::Schema(format!(
                            "row {}: missing value in a required column",
                            row_number + 1
                        )))
                    }
                }
            }

            // Phase two: parse; a present-but-unparsable value is fatal
            let mut row = [0.0f64; NUM_FEATURES];
            for (i, field) in fields.iter().enumerate() {
                row[i] = field.trim().parse::<f64>().map_err(|_| {
                    Error::Schema(format!(
                        "row {}: malformed value '{}' in column '{}'",
                        row_number + 1,
                        field,
                        FEATURE_COLUMNS[i]
                    ))
                })?;
            }
            features.push(row);
            labels.push(label.trim().to_string());
        }

        Ok(Self { features, labels })
    }

    /// Serialize to CSV bytes with the canonical column order
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header: Vec<&str> = FEATURE_COLUMNS.to_vec();
        header.push(LABEL_COLUMN);
        writer
            .write_record(&header)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        for (row, label) in self.features.iter().zip(&self.labels) {
            let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            record.push(label.clone());
            writer
                .write_record(&record)
                .map_err(|e| Error::Serialization(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row labels, in row order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Sorted, de-duplicated label classes
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Feature rows, in row order
    pub fn feature_rows(&self) -> &[[f64; NUM_FEATURES]] {
        &self.features
    }

    /// Features as an `(n_rows, NUM_FEATURES)` matrix
    pub fn feature_matrix(&self) -> Array2<f64> {
        let mut m = Array2::zeros((self.features.len(), NUM_FEATURES));
        for (i, row) in self.features.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m[[i, j]] = v;
            }
        }
        m
    }

    /// New dataset containing the given row indices, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}

/// Load and validate a dataset from the artifact store, dropping rows with
/// missing required values
pub fn read_dataset(store: &dyn ArtifactStore, path: &str) -> Result<Dataset> {
    let bytes = store.get(path)?;
    Dataset::from_csv(&bytes)
}

/// Load and validate a dataset from the artifact store; missing required
/// values are a schema error
pub fn read_dataset_strict(store: &dyn ArtifactStore, path: &str) -> Result<Dataset> {
    let bytes = store.get(path)?;
    Dataset::from_csv_strict(&bytes)
}

/// Write a dataset to the artifact store as CSV
pub fn write_dataset(store: &dyn ArtifactStore, path: &str, dataset: &Dataset) -> Result<()> {
    let bytes = dataset.to_csv()?;
    store.put(path, &bytes)?;
    Ok(())
}
