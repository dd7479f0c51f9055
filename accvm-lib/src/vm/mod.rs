//! contains the exec functions that correspond to the [Mnemonic](crate::core::Mnemonic) variants,
//! and the interpreter that calls them

use std::io;
use std::num::ParseIntError;
use std::result::Result as StdResult;
use thiserror::Error;

use crate::console::Output;
use crate::core::{DecodeError, Mnemonic};
use crate::loader::LoadError;

pub mod interpreter;
pub use interpreter::*;

pub mod session;
pub use session::*;

pub mod subroutine;
pub use subroutine::*;

#[cfg(test)]
mod tests;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{0} requires an operand")]
    MissingOperand(Mnemonic),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Input {input:?} is not a number: {source}")]
    InvalidInput { input: String, source: ParseIntError },

    #[error("Input requested, but the input channel is closed")]
    InputClosed,

    #[error("Jump to undefined label {0}")]
    UndefinedLabel(String),

    #[error("Subroutine {0} was never declared with INC")]
    UndeclaredSubroutine(String),

    #[error("RET outside of a subroutine")]
    ReturnOutsideSubroutine,

    #[error("Subroutine {0} ended without RET")]
    MissingReturn(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Wraps an error with the line it occured on. Errors from subroutines are
    /// wrapped once per interpreter, so they read like a call chain
    #[error("{program}, instruction {line} `{text}`: {source}")]
    At {
        program: String,
        line: usize,
        text: String,
        source: Box<Error>,
    },
}

impl Error {
    /// the error with all location information stripped
    pub fn innermost(&self) -> &Error {
        match self {
            Error::At { source, .. } => source.innermost(),
            other => other,
        }
    }
}

/// returned by all exec_ functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// continue with the next line
    Next,
    /// continue at this line
    Jump(usize),
    /// HALT was executed, stop the whole call chain
    Halt,
    /// RET was executed, control went back to the caller
    Return,
}

pub type Result<T> = StdResult<T, Error>;
pub type ExecResult = Result<ExecOutcome>;

macro_rules! bail{
    ($($err:tt)*) => {
        return Err(Error::$($err)*);
    };
}
pub(crate) use bail;

macro_rules! ok_next {
    () => {
        Ok(ExecOutcome::Next)
    };
}

fn jump_to(label: &str, target: Option<usize>) -> ExecResult {
    target
        .map(ExecOutcome::Jump)
        .ok_or_else(|| Error::UndefinedLabel(label.to_owned()))
}

pub fn exec_load(interp: &mut Interpreter, operand: &str) -> ExecResult {
    interp.accumulator = interp.value_of(operand);
    ok_next!()
}

pub fn exec_store(interp: &mut Interpreter, key: &str) -> ExecResult {
    interp.storage.insert(key.to_owned(), interp.accumulator);
    ok_next!()
}

pub fn exec_add(interp: &mut Interpreter, operand: &str) -> ExecResult {
    let rhs = interp.checked_value_of(operand)?;
    interp.accumulator = interp.accumulator.wrapping_add(rhs);
    ok_next!()
}

pub fn exec_subtract(interp: &mut Interpreter, operand: &str) -> ExecResult {
    let rhs = interp.checked_value_of(operand)?;
    interp.accumulator = interp.accumulator.wrapping_sub(rhs);
    ok_next!()
}

pub fn exec_multiply(interp: &mut Interpreter, operand: &str) -> ExecResult {
    let rhs = interp.checked_value_of(operand)?;
    interp.accumulator = interp.accumulator.wrapping_mul(rhs);
    ok_next!()
}

pub fn exec_divide(interp: &mut Interpreter, operand: &str) -> ExecResult {
    let rhs = interp.checked_value_of(operand)?;
    if rhs == 0 {
        bail!(DivisionByZero);
    }
    interp.accumulator = interp.accumulator.wrapping_div(rhs);
    ok_next!()
}

pub fn exec_jump(interp: &mut Interpreter, label: &str) -> ExecResult {
    let target = interp.find_label(label)?;
    jump_to(label, target)
}

pub fn exec_jineg(interp: &mut Interpreter, label: &str) -> ExecResult {
    let target = interp.find_label(label)?;
    if interp.accumulator < 0 {
        jump_to(label, target)
    } else {
        ok_next!()
    }
}

pub fn exec_jizero(interp: &mut Interpreter, label: &str) -> ExecResult {
    let target = interp.find_label(label)?;
    if interp.accumulator == 0 {
        jump_to(label, target)
    } else {
        ok_next!()
    }
}

// the bitwise instructions always read their operand from storage, even if it looks like a number

pub fn exec_xor(interp: &mut Interpreter, key: &str) -> ExecResult {
    interp.accumulator ^= interp.slot(key);
    ok_next!()
}

pub fn exec_or(interp: &mut Interpreter, key: &str) -> ExecResult {
    interp.accumulator |= interp.slot(key);
    ok_next!()
}

pub fn exec_and(interp: &mut Interpreter, key: &str) -> ExecResult {
    interp.accumulator &= interp.slot(key);
    ok_next!()
}

pub fn exec_andnot(interp: &mut Interpreter, key: &str) -> ExecResult {
    interp.accumulator &= !interp.slot(key);
    ok_next!()
}

pub fn exec_in(interp: &mut Interpreter, _: &str) -> ExecResult {
    let Some(line) = interp.session.read_line()? else {
        bail!(InputClosed);
    };
    let input = line.trim();
    interp.accumulator = input.parse().map_err(|source| Error::InvalidInput {
        input: input.to_owned(),
        source,
    })?;
    ok_next!()
}

pub fn exec_out(interp: &mut Interpreter, _: &str) -> ExecResult {
    interp.session.emit(Output::Value(interp.accumulator))?;
    ok_next!()
}

pub fn exec_aout(interp: &mut Interpreter, _: &str) -> ExecResult {
    let c = u32::try_from(interp.accumulator)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    interp.session.emit(Output::Char(c))?;
    ok_next!()
}

pub fn exec_halt(_: &mut Interpreter, _: &str) -> ExecResult {
    Ok(ExecOutcome::Halt)
}
