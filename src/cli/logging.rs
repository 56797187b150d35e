//! Stage-aware CLI output
//!
//! Stage commands run as units of work under an orchestrator that captures
//! stdout per invocation, so output is plain stage-prefixed lines rather
//! than a structured log stream. Verbosity is one process-wide level taken
//! from the global CLI flags.

/// Output verbosity for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output except errors
    Quiet,
    /// Stage progress lines
    Normal,
    /// Progress plus per-stage details (config knobs, digests, row counts)
    Verbose,
}

impl LogLevel {
    /// Derive the level from the global CLI flags; quiet wins over verbose
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    fn allows(self, required: LogLevel) -> bool {
        match self {
            LogLevel::Quiet => false,
            LogLevel::Normal => required == LogLevel::Normal,
            LogLevel::Verbose => true,
        }
    }
}

/// Print a stage progress line
pub fn info(level: LogLevel, stage: &str, msg: &str) {
    if level.allows(LogLevel::Normal) {
        println!("[{stage}] {msg}");
    }
}

/// Print a stage detail line, shown only at verbose level
pub fn detail(level: LogLevel, stage: &str, msg: &str) {
    if level.allows(LogLevel::Verbose) {
        println!("[{stage}]   {msg}");
    }
}
