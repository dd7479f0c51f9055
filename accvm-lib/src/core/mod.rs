//! The static side of a program: the instruction table, line decoding and label resolution

pub mod mnemonic;
pub use mnemonic::*;

pub mod line;
pub use line::*;

pub mod program;
pub use program::*;
