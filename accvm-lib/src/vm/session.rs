//! The context shared by all interpreters of one run

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{Config, TraceMode};
use crate::console::{Console, Output};
use crate::core::Program;
use crate::loader::{self, SourceReader};
use crate::trace::{self, Tracer};
use crate::vm::Result;

/// Holds what the root interpreter and all of its subroutines have in common: where
/// programs are read from, the console, and the trace.
///
/// Only one interpreter of a call chain is active at any time, so the locks are never
/// contended.
pub struct Session {
    reader: Box<dyn SourceReader>,
    console: Mutex<Box<dyn Console>>,
    tracer: Tracer,
}

impl Session {
    pub fn new<R, C>(config: &Config, reader: R, console: C) -> Arc<Self>
    where
        R: SourceReader + 'static,
        C: Console + 'static,
    {
        Arc::new(Session {
            reader: Box::new(reader),
            console: Mutex::new(Box::new(console)),
            tracer: Tracer::new(config),
        })
    }

    /// loads a program and resolves its labels
    pub fn load(&self, reference: &str) -> Result<Program> {
        let lines = loader::load(self.reader.as_ref(), reference)?;
        let program = Program::new(reference, lines);
        tracing::debug!(
            program = reference,
            lines = program.len(),
            labels = program.labels().len(),
            "loaded program"
        );
        Ok(program)
    }

    pub fn emit(&self, output: Output<'_>) -> Result<()> {
        self.console().emit(output)?;
        Ok(())
    }

    pub fn read_line(&self) -> Result<Option<String>> {
        Ok(self.console().read_line()?)
    }

    /// records a line that is about to be executed
    pub fn trace(&self, tokens: &[&str], accumulator: i64) -> Result<()> {
        match self.tracer.mode() {
            TraceMode::Off => {}
            TraceMode::Debug => {
                self.emit(Output::Trace(&trace::format_entry(tokens, accumulator)))?;
            }
            TraceMode::DryRun => self.tracer.append(&trace::format_entry(tokens, accumulator)),
        }
        Ok(())
    }

    pub fn flush_trace(&self) -> Result<()> {
        Ok(self.tracer.flush()?)
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    fn console(&self) -> MutexGuard<'_, Box<dyn Console>> {
        self.console.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
