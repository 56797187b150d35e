//! Property tests for the stratified splitter
//!
//! Invariants checked across generated datasets and seeds:
//! - determinism: same input + seed means identical partitions
//! - partitions are disjoint and cover every row
//! - per-class test counts follow the rounding rule
//! - every class appears in both partitions

use promover::data::Dataset;
use promover::split::{stratified_indices, SplitConfig};

use proptest::collection::vec;
use proptest::prelude::*;

/// A dataset from per-class row counts (each at least 2)
fn dataset_from_counts(counts: &[usize]) -> Dataset {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (c, &n) in counts.iter().enumerate() {
        for i in 0..n {
            let base = c as f64 * 5.0;
            features.push([base + i as f64 * 0.01, base, base + 1.0, base + 2.0]);
            labels.push(format!("class-{c}"));
        }
    }
    Dataset::new(features, labels)
}

fn class_counts() -> impl Strategy<Value = Vec<usize>> {
    vec(2usize..60, 2..5)
}

proptest! {
    #[test]
    fn prop_split_deterministic(counts in class_counts(), seed in 0u64..1000) {
        let ds = dataset_from_counts(&counts);
        let config = SplitConfig { test_fraction: 0.2, seed };
        let a = stratified_indices(&ds, &config).unwrap();
        let b = stratified_indices(&ds, &config).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_partitions_disjoint_and_complete(counts in class_counts(), seed in 0u64..1000) {
        let ds = dataset_from_counts(&counts);
        let config = SplitConfig { test_fraction: 0.2, seed };
        let (train, test) = stratified_indices(&ds, &config).unwrap();

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        let expected: Vec<usize> = (0..ds.len()).collect();
        prop_assert_eq!(all, expected);
    }

    #[test]
    fn prop_per_class_test_counts_follow_rounding(counts in class_counts(), seed in 0u64..1000) {
        let ds = dataset_from_counts(&counts);
        let config = SplitConfig { test_fraction: 0.2, seed };
        let (_, test_idx) = stratified_indices(&ds, &config).unwrap();
        let test = ds.select(&test_idx);

        for (c, &n) in counts.iter().enumerate() {
            let label = format!("class-{c}");
            let got = test.labels().iter().filter(|l| **l == label).count();
            let expected = ((n as f64 * 0.2).round() as usize).clamp(1, n - 1);
            prop_assert_eq!(got, expected, "class {} of {} rows", c, n);
        }
    }

    #[test]
    fn prop_every_class_in_both_partitions(counts in class_counts(), seed in 0u64..1000) {
        let ds = dataset_from_counts(&counts);
        let config = SplitConfig { test_fraction: 0.2, seed };
        let (train_idx, test_idx) = stratified_indices(&ds, &config).unwrap();
        prop_assert_eq!(ds.select(&train_idx).classes(), ds.classes());
        prop_assert_eq!(ds.select(&test_idx).classes(), ds.classes());
    }

    #[test]
    fn prop_seed_changes_partition_sizes_not_totals(counts in class_counts()) {
        let ds = dataset_from_counts(&counts);
        let a = stratified_indices(&ds, &SplitConfig { test_fraction: 0.2, seed: 1 }).unwrap();
        let b = stratified_indices(&ds, &SplitConfig { test_fraction: 0.2, seed: 2 }).unwrap();
        // Membership may differ with the seed; the per-partition sizes may not
        prop_assert_eq!(a.0.len(), b.0.len());
        prop_assert_eq!(a.1.len(), b.1.len());
    }
}
