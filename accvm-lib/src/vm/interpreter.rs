use std::collections::HashMap;
use std::sync::Arc;

use crate::console::Output;
use crate::core::{decode, tokenize, Line, Operand, Program};
use crate::vm::*;

/// How a call to [`Interpreter::run`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// the program counter ran past the last line
    Finished,
    /// HALT was executed, either by this interpreter or by a subroutine it called
    Halted,
    /// RET was executed and the accumulator was handed to the caller
    Returned,
}

/// The execution state of one program. Subroutines are interpreters of their own,
/// owned by the interpreter that declared them.
pub struct Interpreter {
    pub accumulator: i64,
    pub storage: HashMap<String, i64>,
    pub pc: usize,
    program: Arc<Program>,
    /// subroutines declared with INC, keyed by the reference they were loaded from
    pub(crate) children: HashMap<String, Interpreter>,
    pub(crate) parent: Option<ParentLink>,
    /// only set while this interpreter runs on behalf of a RUN of its parent
    pub(crate) completion: Option<CompletionSignal>,
    pub(crate) session: Arc<Session>,
}

impl Interpreter {
    pub fn new(session: Arc<Session>, program: Program) -> Self {
        Interpreter {
            accumulator: 0,
            storage: HashMap::new(),
            pc: 0,
            program: Arc::new(program),
            children: HashMap::new(),
            parent: None,
            completion: None,
            session,
        }
    }

    /// loads the program `reference` through the session's reader
    pub fn load(session: Arc<Session>, reference: &str) -> Result<Self> {
        let program = session.load(reference)?;
        Ok(Self::new(session, program))
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child(&self, reference: &str) -> Option<&Interpreter> {
        self.children.get(reference)
    }

    /// Runs the program from its first line until it runs out of lines, halts or returns.
    ///
    /// When the root interpreter halts, the dry-run sheet is written.
    pub fn run(&mut self) -> Result<RunOutcome> {
        self.pc = 0;
        let program = Arc::clone(&self.program);
        while let Some(text) = program.line(self.pc) {
            let outcome = self.step(text).map_err(|e| Error::At {
                program: program.reference.clone(),
                line: self.pc,
                text: text.trim().to_owned(),
                source: Box::new(e),
            })?;
            match outcome {
                ExecOutcome::Next => self.pc += 1,
                ExecOutcome::Jump(target) => self.pc = target,
                ExecOutcome::Halt => {
                    if self.is_root() {
                        self.session.flush_trace()?;
                    }
                    return Ok(RunOutcome::Halted);
                }
                ExecOutcome::Return => return Ok(RunOutcome::Returned),
            }
        }
        Ok(RunOutcome::Finished)
    }

    /// fetches, decodes and dispatches a single line
    fn step(&mut self, text: &str) -> ExecResult {
        let tokens = tokenize(text);
        self.session.trace(&tokens, self.accumulator)?;
        let Line::Instr(instr) = decode(&tokens)? else {
            return Ok(ExecOutcome::Next);
        };
        let operand = match instr.operand {
            Some(operand) => operand,
            None if instr.mnemonic.takes_operand() => {
                return Err(Error::MissingOperand(instr.mnemonic));
            }
            None => "",
        };
        instr.mnemonic.dispatch(self, operand)
    }

    /// the value of a literal or of a storage slot, unset slots read as zero
    pub(crate) fn value_of(&self, operand: &str) -> i64 {
        match Operand::parse(operand) {
            Operand::Literal(value) => value,
            Operand::Slot(key) => self.slot(key),
        }
    }

    /// like [`Self::value_of`], but warns about storage slots that were never written
    pub(crate) fn checked_value_of(&self, operand: &str) -> Result<i64> {
        if let Operand::Slot(key) = Operand::parse(operand) {
            if !self.storage.contains_key(key) {
                self.session
                    .emit(Output::Warning(&format!("variable <{key}> does not exist")))?;
            }
        }
        Ok(self.value_of(operand))
    }

    pub(crate) fn slot(&self, key: &str) -> i64 {
        self.storage.get(key).copied().unwrap_or_default()
    }

    /// looks up a jump target, warns if there is none
    pub(crate) fn find_label(&self, label: &str) -> Result<Option<usize>> {
        let target = self.program.label(label);
        if target.is_none() {
            self.session
                .emit(Output::Warning(&format!("label <{label}> does not exist")))?;
        }
        Ok(target)
    }
}
