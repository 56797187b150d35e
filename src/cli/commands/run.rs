//! Run command implementation: the full DAG in process

use super::resolve;
use crate::cli::logging::{detail, info};
use crate::cli::LogLevel;
use crate::config::{PipelineConfig, RunArgs};
use crate::run::{run_pipeline, RunId};
use crate::storage::{join, LocalStore};

pub fn run_run(args: RunArgs, level: LogLevel) -> Result<(), String> {
    let input_csv = resolve(&args.input_csv)?;
    let runs_root = resolve(&args.runs_root)?;
    let model_dir = resolve(&args.model_dir)?;

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path).map_err(|e| format!("Config error: {e}"))?,
        None => PipelineConfig::default(),
    };

    let run_id = match args.run_id {
        Some(id) => RunId::new(id).map_err(|e| format!("Config error: {e}"))?,
        None => RunId::generate(),
    };
    let run_dir = join(&runs_root, run_id.as_str());

    info(level, "run", &format!("{run_id} from {input_csv}"));

    let store = LocalStore::new();
    let report = run_pipeline(&store, &input_csv, &run_dir, &model_dir, &config)
        .map_err(|e| format!("Pipeline error: {e}"))?;

    detail(
        level,
        "run",
        &format!(
            "split: {} train / {} test rows",
            report.split.train_rows, report.split.test_rows
        ),
    );
    info(level, "run", &format!("accuracy={:.4}", report.accuracy));
    if report.promotion.promoted {
        info(level, "run", &format!("promoted to {model_dir}"));
    } else {
        info(
            level,
            "run",
            &format!(
                "not promoted: {}",
                report.promotion.reason.as_deref().unwrap_or("policy declined")
            ),
        );
    }
    Ok(())
}
