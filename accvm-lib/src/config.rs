//! Settings for a run of the machine

use std::path::PathBuf;

/// The file the dry-run sheet is written to, relative to the working directory
pub const DRY_RUN_FILE: &str = "dryrun.txt";

/// What happens with the per-instruction trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    #[default]
    Off,
    /// every executed line is printed to the output channel
    Debug,
    /// every executed line is collected and written to a file on HALT
    DryRun,
}

impl TraceMode {
    /// debug wins if both are requested
    pub fn from_flags(debug: bool, dry_run: bool) -> Self {
        match (debug, dry_run) {
            (true, _) => TraceMode::Debug,
            (false, true) => TraceMode::DryRun,
            (false, false) => TraceMode::Off,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub trace: TraceMode,
    pub dry_run_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trace: TraceMode::Off,
            dry_run_path: PathBuf::from(DRY_RUN_FILE),
        }
    }
}
