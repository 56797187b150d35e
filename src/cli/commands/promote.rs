//! Promote command implementation

use super::resolve;
use crate::cli::logging::{detail, info};
use crate::cli::LogLevel;
use crate::config::PromoteArgs;
use crate::promote::{promote, PolicyKind};
use crate::storage::LocalStore;

pub fn run_promote(args: PromoteArgs, level: LogLevel) -> Result<(), String> {
    let run_dir = resolve(&args.run_dir)?;
    let model_dir = resolve(&args.model_dir)?;
    let policy = PolicyKind::from(args.policy).policy();

    info(
        level,
        "promote",
        &format!("{run_dir} -> {model_dir} (policy: {})", policy.name()),
    );

    let store = LocalStore::new();
    let record = promote(&store, &run_dir, &model_dir, policy.as_ref())
        .map_err(|e| format!("Promotion error: {e}"))?;

    if record.promoted {
        info(
            level,
            "promote",
            &format!(
                "promoted: accuracy={:.4}, production slot now {model_dir}",
                record.accuracy
            ),
        );
        for (name, digest) in &record.digests {
            detail(level, "promote", &format!("{name} sha256={digest}"));
        }
    } else {
        info(
            level,
            "promote",
            &format!(
                "skipped: {}",
                record.reason.as_deref().unwrap_or("policy declined")
            ),
        );
    }
    Ok(())
}
