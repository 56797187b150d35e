//! Evaluate command implementation

use super::resolve;
use crate::cli::logging::info;
use crate::cli::LogLevel;
use crate::config::EvaluateArgs;
use crate::eval::evaluate;
use crate::storage::LocalStore;

pub fn run_evaluate(args: EvaluateArgs, level: LogLevel) -> Result<(), String> {
    let test_csv = resolve(&args.test_csv)?;
    let model = resolve(&args.model)?;
    let out_dir = resolve(&args.out_dir)?;

    info(
        level,
        "evaluate",
        &format!("scoring {model} against {test_csv}"),
    );

    let store = LocalStore::new();
    let record = evaluate(&store, &test_csv, &model, &out_dir)
        .map_err(|e| format!("Evaluation error: {e}"))?;

    info(
        level,
        "evaluate",
        &format!("done: accuracy={:.4}", record.accuracy),
    );
    Ok(())
}
