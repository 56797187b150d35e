//! Promoter stage
//!
//! Conditionally copies a run's model, metadata, and metrics into the stable
//! production slot that serving reads from. The slot has no history: a
//! promotion is a destructive overwrite of the previous contents.
//!
//! The policy is pluggable behind [`PromotionPolicy`]; the default is the
//! unconditional [`AlwaysPromote`], with [`IfNotWorse`] gating on the
//! current production accuracy as the documented alternative.
//!
//! Promotion is three independent copies, not a transaction. All three
//! source files are checked before the first copy (fail closed: a missing
//! source leaves the slot untouched), but a failure after the first copy
//! succeeds leaves the slot inconsistent. That case surfaces as the distinct
//! [`PromoteError::Inconsistent`] so operators can tell "nothing changed"
//! from "the slot now mixes two runs". Concurrent promoters against one slot
//! are not safe; serializing them is the orchestrator's invariant.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::eval::MetricsRecord;
use crate::run::RunLayout;
use crate::storage::{content_digest, ArtifactStore, StorageError};

/// Promotion errors
#[derive(Debug, Error)]
pub enum PromoteError {
    /// A required source artifact is absent; nothing was copied
    #[error("missing source artifact, promotion not attempted: {0}")]
    MissingSource(String),

    /// A copy failed after at least one succeeded; the slot is inconsistent
    #[error("production slot inconsistent: copied {copied:?} before failing: {source}")]
    Inconsistent {
        /// Artifact names copied before the failure
        copied: Vec<String>,
        /// The copy failure
        source: StorageError,
    },

    /// A failure before anything was copied; the slot is unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What a policy decided for one candidate run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Overwrite the production slot
    Promote,
    /// Leave the slot as-is, with the reason
    Skip(String),
}

/// Promotion gate: candidate metrics in, decision out
///
/// `current` is `None` when no run was ever promoted (or the slot's metrics
/// are unreadable).
pub trait PromotionPolicy {
    /// Policy name, recorded in the promotion record
    fn name(&self) -> &'static str;

    /// Decide whether the candidate replaces the current production model
    fn decide(&self, candidate: &MetricsRecord, current: Option<&MetricsRecord>) -> Decision;
}

/// Unconditional promotion: every completed run overwrites the slot
///
/// This is the deliberate default, not an oversight.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPromote;

impl PromotionPolicy for AlwaysPromote {
    fn name(&self) -> &'static str {
        "always"
    }

    fn decide(&self, _candidate: &MetricsRecord, _current: Option<&MetricsRecord>) -> Decision {
        Decision::Promote
    }
}

/// Promote only when candidate accuracy is at least the current production
/// accuracy (an empty slot always accepts)
#[derive(Debug, Clone, Copy, Default)]
pub struct IfNotWorse;

impl PromotionPolicy for IfNotWorse {
    fn name(&self) -> &'static str {
        "if-not-worse"
    }

    fn decide(&self, candidate: &MetricsRecord, current: Option<&MetricsRecord>) -> Decision {
        match current {
            Some(prod) if candidate.accuracy < prod.accuracy => Decision::Skip(format!(
                "candidate accuracy {:.4} below production {:.4}",
                candidate.accuracy, prod.accuracy
            )),
            _ => Decision::Promote,
        }
    }
}

/// Policy selector, serializable for config files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// [`AlwaysPromote`]
    #[default]
    Always,
    /// [`IfNotWorse`]
    IfNotWorse,
}

impl PolicyKind {
    /// Instantiate the selected policy
    pub fn policy(&self) -> Box<dyn PromotionPolicy> {
        match self {
            PolicyKind::Always => Box::new(AlwaysPromote),
            PolicyKind::IfNotWorse => Box::new(IfNotWorse),
        }
    }
}

/// Record of one promoter invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Source run directory
    pub run_dir: String,
    /// Production slot directory
    pub slot_dir: String,
    /// Policy that made the call
    pub policy: String,
    /// Whether the slot was overwritten
    pub promoted: bool,
    /// Skip reason, when not promoted
    pub reason: Option<String>,
    /// Candidate accuracy
    pub accuracy: f64,
    /// SHA-256 digests of the copied artifacts, by file name
    pub digests: BTreeMap<String, String>,
    /// When the overwrite happened
    pub promoted_at: Option<DateTime<Utc>>,
}

/// Promoter stage entry point
///
/// Checks all three sources, reads the candidate (and, if present, current)
/// metrics, applies the policy, and on `Promote` copies model, metadata, and
/// metrics into the slot in that order. The promotion record is also written
/// into the run directory as `promotion.json`.
pub fn promote(
    store: &dyn ArtifactStore,
    run_dir: &str,
    slot_dir: &str,
    policy: &dyn PromotionPolicy,
) -> Result<PromotionRecord> {
    let run = RunLayout::new(run_dir);
    let slot = RunLayout::new(slot_dir);

    // Fail closed: every source must exist before anything is copied
    let transfers = [
        (crate::run::MODEL_FILE, run.model_json(), slot.model_json()),
        (
            crate::run::MODEL_META_FILE,
            run.model_meta_json(),
            slot.model_meta_json(),
        ),
        (
            crate::run::METRICS_FILE,
            run.metrics_json(),
            slot.metrics_json(),
        ),
    ];
    for (_, src, _) in &transfers {
        if !store.exists(src).map_err(PromoteError::from)? {
            return Err(PromoteError::MissingSource(src.clone()).into());
        }
    }

    let candidate: MetricsRecord = serde_json::from_slice(
        &store.get(&run.metrics_json()).map_err(PromoteError::from)?,
    )?;
    // An unreadable slot metrics file counts as "no production model" so a
    // fresh promotion can repair an inconsistent slot
    let current: Option<MetricsRecord> = match store.get(&slot.metrics_json()) {
        Ok(bytes) => serde_json::from_slice(&bytes).ok(),
        Err(_) => None,
    };

    let mut record = PromotionRecord {
        run_dir: run_dir.to_string(),
        slot_dir: slot_dir.to_string(),
        policy: policy.name().to_string(),
        promoted: false,
        reason: None,
        accuracy: candidate.accuracy,
        digests: BTreeMap::new(),
        promoted_at: None,
    };

    match policy.decide(&candidate, current.as_ref()) {
        Decision::Skip(reason) => {
            record.reason = Some(reason);
        }
        Decision::Promote => {
            let mut copied: Vec<String> = Vec::new();
            for (name, src, dst) in &transfers {
                let outcome = store.get(src).and_then(|bytes| {
                    store.put(dst, &bytes)?;
                    Ok(bytes)
                });
                match outcome {
                    Ok(bytes) => {
                        record.digests.insert((*name).to_string(), content_digest(&bytes));
                        copied.push((*name).to_string());
                    }
                    Err(source) if copied.is_empty() => {
                        return Err(PromoteError::Storage(source).into());
                    }
                    Err(source) => {
                        return Err(PromoteError::Inconsistent { copied, source }.into());
                    }
                }
            }
            record.promoted = true;
            record.promoted_at = Some(Utc::now());
        }
    }

    store.put(&run.promotion_json(), &serde_json::to_vec(&record)?)?;
    Ok(record)
}
