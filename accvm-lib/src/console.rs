//! The single scalar input/output channel of the machine

use derive_more::Display;

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything the machine ever writes to its output channel.
///
/// The `Display` impl is the plain text rendering, consoles are free to decorate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Output<'a> {
    /// written by OUT
    #[display(fmt = "< {}", _0)]
    Value(i64),
    /// written by AOUT
    #[display(fmt = "< {}", _0)]
    Char(char),
    #[display(fmt = "WARNING: {}", _0)]
    Warning(&'a str),
    /// a line of the debug trace
    #[display(fmt = "{}", _0)]
    Trace(&'a str),
}

pub trait Console: Send {
    /// blocks for the next line of input, `None` once the input is exhausted
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn emit(&mut self, output: Output<'_>) -> io::Result<()>;
}

/// A console that reads from a queue of prepared lines and records everything that is
/// emitted. Clones share the same buffers, so a handle can be kept to inspect the output
/// after the console was handed to a session.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    inner: Arc<Mutex<Buffers>>,
}

#[derive(Debug, Default)]
struct Buffers {
    input: VecDeque<String>,
    output: Vec<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::new();
        console
            .buffers()
            .input
            .extend(lines.into_iter().map(Into::into));
        console
    }

    /// the rendered lines emitted so far
    pub fn output(&self) -> Vec<String> {
        self.buffers().output.clone()
    }

    fn buffers(&self) -> MutexGuard<'_, Buffers> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Console for BufferConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.buffers().input.pop_front())
    }

    fn emit(&mut self, output: Output<'_>) -> io::Result<()> {
        self.buffers().output.push(output.to_string());
        Ok(())
    }
}
