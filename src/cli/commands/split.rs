//! Split command implementation

use super::resolve;
use crate::cli::logging::{detail, info};
use crate::cli::LogLevel;
use crate::config::SplitArgs;
use crate::split::{split, SplitConfig};
use crate::storage::LocalStore;

pub fn run_split(args: SplitArgs, level: LogLevel) -> Result<(), String> {
    let input_csv = resolve(&args.input_csv)?;
    let out_dir = resolve(&args.out_dir)?;

    let mut config = SplitConfig::default();
    if let Some(f) = args.test_fraction {
        config.test_fraction = f;
    }
    if let Some(s) = args.seed {
        config.seed = s;
    }

    info(level, "split", &format!("{input_csv} -> {out_dir}"));
    detail(
        level,
        "split",
        &format!(
            "test_fraction={} seed={}",
            config.test_fraction, config.seed
        ),
    );

    let store = LocalStore::new();
    let summary =
        split(&store, &input_csv, &out_dir, &config).map_err(|e| format!("Split error: {e}"))?;

    info(
        level,
        "split",
        &format!(
            "done: {} train rows, {} test rows",
            summary.train_rows, summary.test_rows
        ),
    );
    Ok(())
}
