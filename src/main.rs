//! Promover CLI
//!
//! Stage-per-subcommand entry point for the pipeline.
//!
//! # Usage
//!
//! ```bash
//! # One stage at a time (how an orchestrator invokes them)
//! promover split --input-csv data/penguins.csv --out-dir runs/run-1
//! promover train --train-csv runs/run-1/train.csv --out-dir runs/run-1
//! promover evaluate --test-csv runs/run-1/test.csv --model runs/run-1/model.json --out-dir runs/run-1
//! promover promote --run-dir runs/run-1 --model-dir models
//!
//! # Whole pipeline locally
//! promover run --input-csv data/penguins.csv --runs-root runs --model-dir models
//! ```

use clap::Parser;
use promover::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
