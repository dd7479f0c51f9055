//! The instruction table. [`Mnemonic`] is the single source of truth for what is
//! executable; every other first token on a line is a label.
//!
//! Most of the impl is generated by the Mnemonic derive-macro, which wires each variant to
//! the `exec_<mnemonic>` function of the same name. The vm::* import is there for that codegen.

use once_cell::sync::Lazy;
use proc_macros::Mnemonic;

use std::collections::HashMap;
use std::fmt;

use crate::vm::*;

#[derive(Debug, Clone, Copy, Mnemonic, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    #[operand]
    Load,
    #[operand]
    Store,
    #[operand]
    Add,
    #[operand]
    Subtract,
    #[operand]
    Multiply,
    #[operand]
    Divide,
    #[operand]
    Jump,
    /// jump if the accumulator is negative
    #[operand]
    Jineg,
    /// jump if the accumulator is zero
    #[operand]
    Jizero,
    #[operand]
    Xor,
    #[operand]
    Or,
    #[operand]
    And,
    #[operand]
    Andnot,
    In,
    Out,
    /// prints the accumulator as a character
    Aout,
    /// declares a subroutine by loading the program named by the operand
    #[operand]
    Inc,
    #[operand]
    Run,
    Ret,
    Halt,
}

static TABLE: Lazy<HashMap<&'static str, Mnemonic>> =
    Lazy::new(|| Mnemonic::ALL.iter().map(|m| (m.as_str(), *m)).collect());

impl Mnemonic {
    /// Looks up a token in the instruction table. Case sensitive.
    pub fn lookup(token: &str) -> Option<Self> {
        TABLE.get(token).copied()
    }

    pub fn is_mnemonic(token: &str) -> bool {
        TABLE.contains_key(token)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
