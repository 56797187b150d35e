//! CLI command implementations

mod evaluate;
mod promote;
mod run;
mod split;
mod train;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};
use crate::storage::local_path;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Split(args) => split::run_split(args, log_level),
        Command::Train(args) => train::run_train(args, log_level),
        Command::Evaluate(args) => evaluate::run_evaluate(args, log_level),
        Command::Promote(args) => promote::run_promote(args, log_level),
        Command::Run(args) => run::run_run(args, log_level),
    }
}

/// Resolve a storage URI to a local path, surfacing scheme errors as strings
pub(crate) fn resolve(uri: &str) -> Result<String, String> {
    local_path(uri).map_err(|e| format!("Storage error: {e}"))
}
