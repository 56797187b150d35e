//! CLI argument parsing
//!
//! One subcommand per pipeline stage, plus `run` for the whole DAG in
//! process. Each stage command mirrors the argument contract an external
//! orchestrator uses: named string paths in, exit code out.
//!
//! # Usage
//!
//! ```bash
//! promover split --input-csv data/penguins.csv --out-dir runs/run-1
//! promover train --train-csv runs/run-1/train.csv --out-dir runs/run-1
//! promover evaluate --test-csv runs/run-1/test.csv --model runs/run-1/model.json --out-dir runs/run-1
//! promover promote --run-dir runs/run-1 --model-dir models
//! promover run --input-csv data/penguins.csv --runs-root runs --model-dir models
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::promote::PolicyKind;

/// Promover: train, evaluate, and promote a tabular classifier
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "promover")]
#[command(version)]
#[command(about = "Deterministic split/train/evaluate/promote pipeline for small tabular classifiers")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Stratified train/test split of the raw dataset
    Split(SplitArgs),

    /// Fit the scaler+classifier on a train split
    Train(TrainArgs),

    /// Score a fitted model against a test split
    Evaluate(EvaluateArgs),

    /// Promote a run's artifacts into the production slot
    Promote(PromoteArgs),

    /// Execute all four stages for one run
    Run(RunArgs),
}

/// Arguments for the split command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SplitArgs {
    /// Raw labeled dataset (CSV with header)
    #[arg(long, value_name = "URI")]
    pub input_csv: String,

    /// Run directory for train.csv / test.csv
    #[arg(long, value_name = "URI")]
    pub out_dir: String,

    /// Override the test fraction
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Override the split seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Train split produced by the splitter
    #[arg(long, value_name = "URI")]
    pub train_csv: String,

    /// Run directory for model.json / model_meta.json
    #[arg(long, value_name = "URI")]
    pub out_dir: String,

    /// Override the solver iteration budget
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Override the solver step size
    #[arg(long)]
    pub learning_rate: Option<f64>,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// Test split produced by the splitter
    #[arg(long, value_name = "URI")]
    pub test_csv: String,

    /// Model artifact produced by the trainer
    #[arg(long, value_name = "URI")]
    pub model: String,

    /// Run directory for metrics.json
    #[arg(long, value_name = "URI")]
    pub out_dir: String,
}

/// Arguments for the promote command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PromoteArgs {
    /// Completed run directory
    #[arg(long, value_name = "URI")]
    pub run_dir: String,

    /// Production slot directory
    #[arg(long, value_name = "URI")]
    pub model_dir: String,

    /// Promotion policy
    #[arg(long, value_enum, default_value = "always")]
    pub policy: PolicyArg,
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Raw labeled dataset (CSV with header)
    #[arg(long, value_name = "URI")]
    pub input_csv: String,

    /// Directory that holds per-run subdirectories
    #[arg(long, value_name = "URI")]
    pub runs_root: String,

    /// Production slot directory
    #[arg(long, value_name = "URI")]
    pub model_dir: String,

    /// Run id (generated when omitted)
    #[arg(long)]
    pub run_id: Option<String>,

    /// YAML pipeline config
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Promotion policy CLI selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Every completed run overwrites the slot
    Always,
    /// Promote only when accuracy does not regress
    IfNotWorse,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Always => PolicyKind::Always,
            PolicyArg::IfNotWorse => PolicyKind::IfNotWorse,
        }
    }
}

/// Parse CLI arguments from an iterator (testable entry point)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
