//! Train command implementation

use super::resolve;
use crate::cli::logging::{detail, info};
use crate::cli::LogLevel;
use crate::config::TrainArgs;
use crate::model::TrainConfig;
use crate::storage::LocalStore;
use crate::train::train;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    let train_csv = resolve(&args.train_csv)?;
    let out_dir = resolve(&args.out_dir)?;

    let mut config = TrainConfig::default();
    if let Some(n) = args.max_iter {
        config.max_iter = n;
    }
    if let Some(lr) = args.learning_rate {
        config.learning_rate = lr;
    }

    info(level, "train", &format!("fitting from {train_csv}"));
    detail(
        level,
        "train",
        &format!(
            "max_iter={} learning_rate={}",
            config.max_iter, config.learning_rate
        ),
    );

    let store = LocalStore::new();
    let pipeline = train(&store, &train_csv, &out_dir, &config)
        .map_err(|e| format!("Training error: {e}"))?;

    info(
        level,
        "train",
        &format!(
            "done: {} classes {:?}",
            pipeline.classes.len(),
            pipeline.classes
        ),
    );
    Ok(())
}
