//! Turns program text into the instruction stream the interpreter runs on.
//!
//! Reading the raw text is delegated to a [`SourceReader`], so programs can come from
//! the file system ([`FsReader`]) or from memory ([`MemoryReader`]).

use std::collections::HashMap;
use std::io;
use thiserror::Error;

/// Where program text comes from. The reference is the textual name a program is known
/// by, e.g. the path given on the command line or the operand of `INC`.
pub trait SourceReader: Send + Sync {
    fn read(&self, reference: &str) -> io::Result<String>;
}

/// Reads references as paths relative to the working directory
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, reference: &str) -> io::Result<String> {
        std::fs::read_to_string(reference)
    }
}

/// Serves programs from a map of reference to source text
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    sources: HashMap<String, String>,
}

impl MemoryReader {
    pub fn new<K, V>(sources: HashMap<K, V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sources: sources
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, reference: impl Into<String>, src: impl Into<String>) {
        self.sources.insert(reference.into(), src.into());
    }
}

impl SourceReader for MemoryReader {
    fn read(&self, reference: &str) -> io::Result<String> {
        self.sources.get(reference).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no source named {reference}"))
        })
    }
}

#[derive(Error, Debug)]
#[error("Could not load program {reference}: {source}")]
pub struct LoadError {
    pub reference: String,
    #[source]
    pub source: io::Error,
}

/// reads `reference` through `reader` and strips its comments
pub fn load(reader: &dyn SourceReader, reference: &str) -> Result<Vec<String>, LoadError> {
    let src = reader.read(reference).map_err(|source| LoadError {
        reference: reference.to_owned(),
        source,
    })?;
    Ok(strip_comments(&src))
}

/// Splits source text into lines and removes comments.
///
/// A line starting with `;` is dropped entirely, so the indices of the remaining
/// lines are contiguous. A `;` later in the line cuts the line off right before it.
pub fn strip_comments(src: &str) -> Vec<String> {
    src.trim_end_matches(['\r', '\n'])
        .split('\n')
        .map(|line| line.trim_matches(['\r', '\n']))
        .filter_map(|line| match line.find(';') {
            Some(0) => None,
            Some(pos) => Some(line[..pos].to_owned()),
            None => Some(line.to_owned()),
        })
        .collect()
}
