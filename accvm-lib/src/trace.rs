//! The per-instruction trace used by the debug and dry-run modes

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::config::{Config, TraceMode};

/// formats a trace entry, e.g. `Instruction: [LOAD 5] Accumulator: 0`
pub fn format_entry(tokens: &[&str], accumulator: i64) -> String {
    format!(
        "Instruction: [{}] Accumulator: {}",
        tokens.join(" "),
        accumulator
    )
}

/// Collects the dry-run sheet. Shared by all interpreters of a run, so entries of
/// subroutines end up in the same sheet.
#[derive(Debug)]
pub struct Tracer {
    mode: TraceMode,
    sheet: Mutex<String>,
    path: PathBuf,
}

impl Tracer {
    pub fn new(config: &Config) -> Self {
        Tracer {
            mode: config.trace,
            sheet: Mutex::new(String::new()),
            path: config.dry_run_path.clone(),
        }
    }

    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    pub fn append(&self, entry: &str) {
        let mut sheet = self.sheet.lock().unwrap_or_else(PoisonError::into_inner);
        sheet.push_str(entry);
        sheet.push('\n');
    }

    pub fn sheet(&self) -> String {
        self.sheet
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// writes the sheet to its file, does nothing unless in dry-run mode
    pub fn flush(&self) -> io::Result<()> {
        if self.mode != TraceMode::DryRun {
            return Ok(());
        }
        tracing::debug!(path = %self.path.display(), "writing dry-run sheet");
        std::fs::write(&self.path, self.sheet())
    }
}
