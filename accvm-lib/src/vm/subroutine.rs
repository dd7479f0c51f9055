//! INC, RUN and RET: programs called like functions.
//!
//! The caller owns its subroutines. A RUN hands the callee a fresh one-shot channel and
//! runs it on a scoped thread while the caller blocks on the receiving end, so from the
//! caller's point of view RUN is synchronous.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

use crate::vm::*;

/// The relation of a subroutine to the interpreter that declared it. It does not own
/// or point to the parent, it only names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// reference of the parent's program
    pub reference: String,
}

/// what a subroutine reports back to the RUN that started it
#[derive(Debug)]
pub enum Completion {
    Returned(i64),
    Halted,
    Failed(Error),
}

/// The sending half of the channel a RUN waits on
#[derive(Debug)]
pub struct CompletionSignal(SyncSender<Completion>);

impl CompletionSignal {
    fn channel() -> (Self, Receiver<Completion>) {
        let (tx, rx) = mpsc::sync_channel(1);
        (CompletionSignal(tx), rx)
    }

    fn signal(self, completion: Completion) {
        // the caller keeps the receiver until the callee's thread is joined
        let _ = self.0.send(completion);
    }
}

pub fn exec_inc(interp: &mut Interpreter, reference: &str) -> ExecResult {
    let program = interp.session.load(reference)?;
    let mut child = Interpreter::new(Arc::clone(&interp.session), program);
    child.parent = Some(ParentLink {
        reference: interp.program().reference.clone(),
    });
    tracing::debug!(
        parent = %interp.program().reference,
        subroutine = reference,
        "declared subroutine"
    );
    interp.children.insert(reference.to_owned(), child);
    Ok(ExecOutcome::Next)
}

pub fn exec_run(interp: &mut Interpreter, name: &str) -> ExecResult {
    let accumulator = interp.accumulator;
    let Some(child) = interp.children.get_mut(name) else {
        bail!(UndeclaredSubroutine(name.to_owned()));
    };
    child.accumulator = accumulator;
    let (signal, done) = CompletionSignal::channel();
    child.completion = Some(signal);

    tracing::debug!(subroutine = name, accumulator, "invoking subroutine");
    let completion = thread::scope(|s| {
        s.spawn(|| child.run_as_subroutine());
        done.recv()
    });
    tracing::trace!(subroutine = name, ?completion, "subroutine completed");

    match completion {
        Ok(Completion::Returned(value)) => {
            interp.accumulator = value;
            Ok(ExecOutcome::Next)
        }
        Ok(Completion::Halted) => Ok(ExecOutcome::Halt),
        Ok(Completion::Failed(e)) => Err(e),
        Err(mpsc::RecvError) => Err(Error::MissingReturn(name.to_owned())),
    }
}

pub fn exec_ret(interp: &mut Interpreter, _: &str) -> ExecResult {
    let Some(signal) = interp.completion.take() else {
        bail!(ReturnOutsideSubroutine);
    };
    signal.signal(Completion::Returned(interp.accumulator));
    Ok(ExecOutcome::Return)
}

impl Interpreter {
    /// The body of the thread a RUN starts. Reports everything but a RET, which signals
    /// on its own. Running out of lines drops the signal, which the caller sees as a
    /// missing RET.
    fn run_as_subroutine(&mut self) {
        let outcome = self.run();
        let Some(signal) = self.completion.take() else {
            return;
        };
        match outcome {
            Ok(RunOutcome::Halted) => signal.signal(Completion::Halted),
            Ok(RunOutcome::Finished | RunOutcome::Returned) => {}
            Err(e) => signal.signal(Completion::Failed(e)),
        }
    }
}
