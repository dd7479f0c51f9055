//! Decoding of a single comment-stripped line into the instruction it holds

use thiserror::Error;

use crate::core::Mnemonic;

/// What a line of a program amounts to once split into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// no tokens at all
    Blank,
    /// a label on its own, only there to be jumped to
    Anchor(&'a str),
    Instr(Instruction<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// set if the instruction shares its line with a label
    pub label: Option<&'a str>,
    pub mnemonic: Mnemonic,
    pub operand: Option<&'a str>,
}

/// An operand is a literal if it parses as an integer, a storage key otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    Literal(i64),
    Slot(&'a str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown instruction {token} after label {label}")]
    UnknownInstruction { label: String, token: String },

    #[error("Too many tokens, an instruction takes at most one operand: {0}")]
    MalformedLine(String),
}

pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Decides what a tokenized line is.
///
/// If the first token is a mnemonic, the second one is its operand. Otherwise the first
/// token is a label, the second one the mnemonic and the third one the operand.
pub fn decode<'a>(tokens: &[&'a str]) -> Result<Line<'a>, DecodeError> {
    let malformed = || DecodeError::MalformedLine(tokens.join(" "));
    match tokens {
        [] => Ok(Line::Blank),
        [first, rest @ ..] => {
            if let Some(mnemonic) = Mnemonic::lookup(first) {
                if rest.len() > 1 {
                    return Err(malformed());
                }
                return Ok(Line::Instr(Instruction {
                    label: None,
                    mnemonic,
                    operand: rest.first().copied(),
                }));
            }
            match rest {
                [] => Ok(Line::Anchor(*first)),
                [token, operand @ ..] => {
                    let mnemonic = Mnemonic::lookup(token).ok_or_else(|| {
                        DecodeError::UnknownInstruction {
                            label: first.to_string(),
                            token: token.to_string(),
                        }
                    })?;
                    if operand.len() > 1 {
                        return Err(malformed());
                    }
                    Ok(Line::Instr(Instruction {
                        label: Some(*first),
                        mnemonic,
                        operand: operand.first().copied(),
                    }))
                }
            }
        }
    }
}

impl<'a> Operand<'a> {
    pub fn parse(text: &'a str) -> Self {
        match text.parse() {
            Ok(value) => Operand::Literal(value),
            Err(_) => Operand::Slot(text),
        }
    }
}
