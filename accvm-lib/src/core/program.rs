//! A loaded program together with its label table

use std::collections::HashMap;

use crate::core::Mnemonic;

pub type Labels = HashMap<String, usize>;

/// The immutable part of an interpreter: the comment-stripped lines and the labels
/// that point into them
#[derive(Debug, Clone)]
pub struct Program {
    /// the name the program was loaded by
    pub reference: String,
    lines: Vec<String>,
    labels: Labels,
}

impl Program {
    pub fn new(reference: impl Into<String>, lines: Vec<String>) -> Self {
        let labels = resolve_labels(&lines);
        Program {
            reference: reference.into(),
            lines,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

/// Records the index of every line whose first token is not a mnemonic.
///
/// A label that is spelled like a mnemonic is therefore never a label. If the same label
/// appears twice, the later line wins.
pub fn resolve_labels(lines: &[String]) -> Labels {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let first = line.split_whitespace().next()?;
            (!Mnemonic::is_mnemonic(first)).then(|| (first.to_owned(), idx))
        })
        .collect()
}
