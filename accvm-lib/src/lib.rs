//! An accumulator machine for a small line based assembly language.
//!
//! What you need to do to execute a script is the following:
//! 1. create a [`config::Config`], a [`loader::SourceReader`] that knows where programs
//!    live, and a [`console::Console`] for input and output
//! 1. bundle them into a session with [`vm::Session::new`]
//! 1. load the root program with [`vm::Interpreter::load`], which strips comments and
//!    resolves labels
//! 1. call [`vm::Interpreter::run`] and handle the error:
//!
//!    ```
//!    use accvm_lib::config::Config;
//!    use accvm_lib::console::BufferConsole;
//!    use accvm_lib::loader::MemoryReader;
//!    use accvm_lib::vm::{Interpreter, RunOutcome, Session};
//!    use std::collections::HashMap;
//!
//!    let mut reader = MemoryReader::new(HashMap::<String, String>::new());
//!    reader.insert("main.acc", "LOAD 5\nSTORE x\nLOAD 3\nADD x\nOUT\nHALT");
//!    let console = BufferConsole::new();
//!    let session = Session::new(&Config::default(), reader, console.clone());
//!    let mut interp = Interpreter::load(session, "main.acc").unwrap();
//!    assert_eq!(interp.run().unwrap(), RunOutcome::Halted);
//!    assert_eq!(console.output(), vec!["< 8"]);
//!    ```
//!
//! Subroutines are declared with `INC <program>` and called with `RUN <program>`. Each one
//! is an interpreter of its own and runs on its own thread while the caller waits.
pub mod config;
pub mod console;
pub mod core;
pub mod loader;
pub mod trace;
pub mod vm;
