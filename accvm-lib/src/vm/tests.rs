use std::collections::HashMap;
use std::sync::Arc;

use maplit::hashmap;

use crate::config::{Config, TraceMode};
use crate::console::BufferConsole;
use crate::loader::MemoryReader;
use crate::vm::*;

struct Harness {
    session: Arc<Session>,
    console: BufferConsole,
}

impl Harness {
    fn new(sources: HashMap<&str, &str>) -> Self {
        Self::with_input(sources, &[])
    }

    fn with_input(sources: HashMap<&str, &str>, input: &[&str]) -> Self {
        Self::with_config(sources, input, &Config::default())
    }

    fn with_config(sources: HashMap<&str, &str>, input: &[&str], config: &Config) -> Self {
        let console = BufferConsole::with_input(input.iter().copied());
        let session = Session::new(config, MemoryReader::new(sources), console.clone());
        Harness { session, console }
    }

    fn interpreter(&self, reference: &str) -> Interpreter {
        Interpreter::load(Arc::clone(&self.session), reference).unwrap()
    }

    /// runs `main.acc` and returns the interpreter for inspection
    fn run_main(&self) -> (Result<RunOutcome>, Interpreter) {
        let mut interp = self.interpreter("main.acc");
        let res = interp.run();
        (res, interp)
    }

    fn output(&self) -> Vec<String> {
        self.console.output()
    }
}

fn run_src(src: &str) -> (Result<RunOutcome>, Vec<String>) {
    let harness = Harness::new(hashmap! { "main.acc" => src });
    let (res, _) = harness.run_main();
    (res, harness.output())
}

#[test]
fn test_store_and_add() {
    let (res, out) = run_src("LOAD 5\nSTORE x\nLOAD 3\nADD x\nOUT\nHALT");
    assert_eq!(res.unwrap(), RunOutcome::Halted);
    assert_eq!(out, vec!["< 8"]);
}

#[test]
fn test_division_by_zero_is_fatal() {
    let (res, out) = run_src("LOAD 1\nDIVIDE 0\nOUT\nHALT");
    let err = res.unwrap_err();
    assert!(matches!(err.innermost(), Error::DivisionByZero));
    let Error::At { line, text, .. } = &err else {
        panic!("expected a located error, got {err:?}");
    };
    assert_eq!(*line, 1);
    assert_eq!(text, "DIVIDE 0");
    assert!(out.is_empty());
}

#[test]
fn test_division_truncates() {
    let (_, out) = run_src("LOAD -7\nDIVIDE 2\nOUT\nLOAD 7\nSTORE d\nLOAD 50\nDIVIDE d\nOUT");
    assert_eq!(out, vec!["< -3", "< 7"]);
}

#[test]
fn test_load_store_load_roundtrip() {
    for literal in [0, 1, -1, 42, i64::MAX, i64::MIN] {
        let harness = Harness::new(hashmap! {
            "main.acc" => "LOAD lit\nSTORE x\nLOAD 0\nLOAD x\nHALT",
        });
        let mut interp = harness.interpreter("main.acc");
        interp.storage.insert("lit".into(), literal);
        interp.run().unwrap();
        assert_eq!(interp.accumulator, literal);
        assert_eq!(interp.storage["x"], literal);
    }
}

#[test]
fn test_load_of_unset_slot_reads_zero_silently() {
    let (_, out) = run_src("LOAD 9\nLOAD nothing\nOUT");
    assert_eq!(out, vec!["< 0"]);
}

#[test]
fn test_arithmetic_warns_about_unset_slot() {
    let (res, out) = run_src("LOAD 4\nADD y\nSUBTRACT 1\nOUT");
    assert_eq!(res.unwrap(), RunOutcome::Finished);
    assert_eq!(out, vec!["WARNING: variable <y> does not exist", "< 3"]);
}

#[test]
fn test_bitwise_reads_storage() {
    let (_, out) = run_src(
        "LOAD 12\nSTORE x\n\
         LOAD 10\nXOR x\nOUT\n\
         LOAD 10\nOR x\nOUT\n\
         LOAD 10\nAND x\nOUT\n\
         LOAD 10\nANDNOT x\nOUT\n\
         LOAD 5\nOR 3\nOUT",
    );
    assert_eq!(out, vec!["< 6", "< 14", "< 8", "< 2", "< 5"]);
}

#[test]
fn test_countdown_loop() {
    let (res, out) = run_src(
        "LOAD 3\n\
         loop SUBTRACT 1\n\
         OUT\n\
         JIZERO done\n\
         JUMP loop\n\
         done HALT",
    );
    assert_eq!(res.unwrap(), RunOutcome::Halted);
    assert_eq!(out, vec!["< 2", "< 1", "< 0"]);
}

#[test]
fn test_jineg() {
    let (_, out) = run_src("LOAD -1\nJINEG neg\nLOAD 0\nOUT\nneg OUT\nLOAD 1\nJINEG neg\nOUT");
    assert_eq!(out, vec!["< -1", "< 1"]);
}

#[test]
fn test_jump_lands_on_label_line() {
    // with a trace, the executed lines can be observed in order
    for (target_line, src) in [
        (1, "JUMP t\nt OUT\nHALT"),
        (3, "JUMP t\nLOAD 1\nOUT\nt LOAD 2\nHALT"),
        (4, "JUMP t\n; comment lines do not count\nLOAD 1\nOUT\n\nt\nHALT"),
    ] {
        let config = Config {
            trace: TraceMode::Debug,
            ..Config::default()
        };
        let harness = Harness::with_config(hashmap! { "main.acc" => src }, &[], &config);
        let (res, interp) = harness.run_main();
        assert_eq!(res.unwrap(), RunOutcome::Halted);
        assert_eq!(interp.program().label("t"), Some(target_line));
        let out = harness.output();
        let expected = format!(
            "Instruction: [{}] Accumulator: 0",
            interp.program().line(target_line).unwrap().trim()
        );
        assert_eq!(out[1], expected);
    }
}

#[test]
fn test_taken_jump_to_unknown_label_fails() {
    let (res, out) = run_src("LOAD 0\nJIZERO nowhere\nOUT");
    let err = res.unwrap_err();
    assert!(matches!(err.innermost(), Error::UndefinedLabel(l) if l == "nowhere"));
    assert_eq!(out, vec!["WARNING: label <nowhere> does not exist"]);
}

#[test]
fn test_untaken_jump_to_unknown_label_warns() {
    let (res, out) = run_src("LOAD 1\nJIZERO nowhere\nOUT");
    assert_eq!(res.unwrap(), RunOutcome::Finished);
    assert_eq!(out, vec!["WARNING: label <nowhere> does not exist", "< 1"]);
}

#[test]
fn test_in_reads_a_number() {
    let harness = Harness::with_input(
        hashmap! { "main.acc" => "IN\nMULTIPLY 2\nOUT\nIN\nOUT" },
        &["  12 ", "-3"],
    );
    harness.run_main().0.unwrap();
    assert_eq!(harness.output(), vec!["< 24", "< -3"]);
}

#[test]
fn test_in_rejects_garbage() {
    let harness = Harness::with_input(hashmap! { "main.acc" => "IN\nOUT" }, &["twelve"]);
    let err = harness.run_main().0.unwrap_err();
    assert!(matches!(err.innermost(), Error::InvalidInput { input, .. } if input == "twelve"));
}

#[test]
fn test_in_on_closed_input() {
    let harness = Harness::new(hashmap! { "main.acc" => "IN" });
    let err = harness.run_main().0.unwrap_err();
    assert!(matches!(err.innermost(), Error::InputClosed));
}

#[test]
fn test_aout() {
    let (_, out) = run_src("LOAD 72\nAOUT\nLOAD 105\nAOUT\nLOAD -1\nAOUT");
    assert_eq!(out, vec!["< H", "< i", "< \u{FFFD}"]);
}

#[test]
fn test_blank_and_anchor_lines_are_noops() {
    let (res, out) = run_src("LOAD 2\n\nanchor\n   \nOUT");
    assert_eq!(res.unwrap(), RunOutcome::Finished);
    assert_eq!(out, vec!["< 2"]);
}

#[test]
fn test_operand_validation() {
    let (res, _) = run_src("LOAD");
    assert!(matches!(
        res.unwrap_err().innermost(),
        Error::MissingOperand(crate::core::Mnemonic::Load)
    ));

    // operand-less instructions ignore what they are given
    let (res, out) = run_src("LOAD 4\nOUT extra");
    assert_eq!(res.unwrap(), RunOutcome::Finished);
    assert_eq!(out, vec!["< 4"]);
}

#[test]
fn test_decode_errors_are_fatal() {
    let (res, _) = run_src("loop LAOD 1");
    assert!(matches!(res.unwrap_err().innermost(), Error::Decode(_)));
}

#[test]
fn test_halt_stops_early() {
    let (res, out) = run_src("LOAD 1\nOUT\nHALT\nOUT");
    assert_eq!(res.unwrap(), RunOutcome::Halted);
    assert_eq!(out, vec!["< 1"]);
}

#[test]
fn test_subroutine_result_replaces_accumulator() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "LOAD 99\nINC sub.asm\nRUN sub.asm\nOUT\nHALT",
        "sub.asm" => "LOAD 10\nRET",
    });
    assert_eq!(harness.run_main().0.unwrap(), RunOutcome::Halted);
    assert_eq!(harness.output(), vec!["< 10"]);
}

#[test]
fn test_ret_only_subroutine_keeps_accumulator() {
    for value in [-5, 0, 42] {
        let harness = Harness::new(hashmap! {
            "main.acc" => "LOAD acc\nINC ret.acc\nRUN ret.acc",
            "ret.acc" => "RET",
        });
        let mut interp = harness.interpreter("main.acc");
        interp.storage.insert("acc".into(), value);
        assert_eq!(interp.run().unwrap(), RunOutcome::Finished);
        assert_eq!(interp.accumulator, value);
    }
}

#[test]
fn test_subroutine_sees_callers_accumulator() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "LOAD 2\nINC a.acc\nRUN a.acc\nOUT",
        "a.acc" => "INC b.acc\nADD 1\nRUN b.acc\nADD 1\nRET",
        "b.acc" => "MULTIPLY 10\nRET",
    });
    harness.run_main().0.unwrap();
    assert_eq!(harness.output(), vec!["< 31"]);
}

#[test]
fn test_subroutine_state_persists_until_redeclared() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "INC c.acc\nRUN c.acc\nRUN c.acc\nOUT\nINC c.acc\nRUN c.acc\nOUT",
        "c.acc" => "LOAD count\nADD 1\nSTORE count\nRET",
    });
    let (res, interp) = harness.run_main();
    res.unwrap();
    assert_eq!(harness.output(), vec!["< 2", "< 1"]);

    let child = interp.child("c.acc").unwrap();
    assert_eq!(child.storage["count"], 1);
    assert_eq!(
        child.parent(),
        Some(&ParentLink {
            reference: "main.acc".into()
        })
    );
    assert!(interp.is_root());
}

#[test]
fn test_recursive_subroutine() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "LOAD 3\nINC rec.acc\nRUN rec.acc\nHALT",
        "rec.acc" => "JIZERO base\nOUT\nSUBTRACT 1\nINC rec.acc\nRUN rec.acc\nbase RET",
    });
    assert_eq!(harness.run_main().0.unwrap(), RunOutcome::Halted);
    assert_eq!(harness.output(), vec!["< 3", "< 2", "< 1"]);
}

#[test]
fn test_run_of_undeclared_subroutine() {
    let (res, _) = run_src("RUN sub.acc");
    assert!(matches!(
        res.unwrap_err().innermost(),
        Error::UndeclaredSubroutine(name) if name == "sub.acc"
    ));
}

#[test]
fn test_ret_in_root() {
    let (res, _) = run_src("LOAD 1\nRET");
    assert!(matches!(
        res.unwrap_err().innermost(),
        Error::ReturnOutsideSubroutine
    ));
}

#[test]
fn test_subroutine_without_ret() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "INC sub.acc\nRUN sub.acc\nOUT",
        "sub.acc" => "LOAD 1",
    });
    let err = harness.run_main().0.unwrap_err();
    assert!(matches!(err.innermost(), Error::MissingReturn(name) if name == "sub.acc"));
    assert!(harness.output().is_empty());
}

#[test]
fn test_halt_in_subroutine_halts_caller() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "INC h.acc\nRUN h.acc\nOUT",
        "h.acc" => "LOAD 5\nOUT\nHALT",
    });
    assert_eq!(harness.run_main().0.unwrap(), RunOutcome::Halted);
    assert_eq!(harness.output(), vec!["< 5"]);
}

#[test]
fn test_subroutine_error_reads_like_a_call_chain() {
    let harness = Harness::new(hashmap! {
        "main.acc" => "INC bad.acc\nRUN bad.acc",
        "bad.acc" => "LOAD 1\nDIVIDE 0\nRET",
    });
    let err = harness.run_main().0.unwrap_err();
    assert!(matches!(err.innermost(), Error::DivisionByZero));
    let msg = err.to_string();
    assert!(msg.starts_with("main.acc, instruction 1 `RUN bad.acc`"));
    assert!(msg.contains("bad.acc, instruction 1 `DIVIDE 0`"));
}

#[test]
fn test_inc_of_missing_program() {
    let (res, _) = run_src("INC missing.acc");
    assert!(matches!(res.unwrap_err().innermost(), Error::Load(e) if e.reference == "missing.acc"));
}

#[test]
fn test_debug_trace_includes_subroutines() {
    let config = Config {
        trace: TraceMode::Debug,
        ..Config::default()
    };
    let harness = Harness::with_config(
        hashmap! {
            "main.acc" => "LOAD 1\nINC s.acc\nRUN s.acc\nHALT",
            "s.acc" => "RET",
        },
        &[],
        &config,
    );
    harness.run_main().0.unwrap();
    assert_eq!(
        harness.output(),
        vec![
            "Instruction: [LOAD 1] Accumulator: 0",
            "Instruction: [INC s.acc] Accumulator: 1",
            "Instruction: [RUN s.acc] Accumulator: 1",
            "Instruction: [RET] Accumulator: 1",
            "Instruction: [HALT] Accumulator: 1",
        ]
    );
}

#[test]
fn test_dry_run_sheet_written_on_halt_only() {
    let path = std::env::temp_dir().join("accvm_vm_dry_run.txt");
    let config = Config {
        trace: TraceMode::DryRun,
        dry_run_path: path.clone(),
    };

    let harness = Harness::with_config(hashmap! { "main.acc" => "LOAD 1\nOUT" }, &[], &config);
    let _ = std::fs::remove_file(&path);
    harness.run_main().0.unwrap();
    assert!(!path.exists());
    // the trace does not go to the console in dry-run mode
    assert_eq!(harness.output(), vec!["< 1"]);

    let harness = Harness::with_config(hashmap! { "main.acc" => "LOAD 1\nHALT" }, &[], &config);
    harness.run_main().0.unwrap();
    let sheet = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(
        sheet,
        "Instruction: [LOAD 1] Accumulator: 0\nInstruction: [HALT] Accumulator: 1\n"
    );
}

/// A straight-line program without control flow or subroutines, kept as data so a
/// reference evaluation can be compared with the interpreter
#[derive(Debug, Clone, Copy)]
enum Op {
    Load(i64),
    Store(&'static str),
    LoadVar(&'static str),
    Add(i64),
    AddVar(&'static str),
    Subtract(i64),
    Multiply(i64),
    Divide(i64),
    Xor(&'static str),
    Or(&'static str),
    And(&'static str),
    AndNot(&'static str),
}

impl Op {
    fn to_line(self) -> String {
        use Op::*;
        match self {
            Load(v) => format!("LOAD {v}"),
            Store(k) => format!("STORE {k}"),
            LoadVar(k) => format!("LOAD {k}"),
            Add(v) => format!("ADD {v}"),
            AddVar(k) => format!("ADD {k}"),
            Subtract(v) => format!("SUBTRACT {v}"),
            Multiply(v) => format!("MULTIPLY {v}"),
            Divide(v) => format!("DIVIDE {v}"),
            Xor(k) => format!("XOR {k}"),
            Or(k) => format!("OR {k}"),
            And(k) => format!("AND {k}"),
            AndNot(k) => format!("ANDNOT {k}"),
        }
    }
}

fn reference_eval(ops: &[Op]) -> i64 {
    let mut acc = 0i64;
    let mut vars: HashMap<&str, i64> = HashMap::new();
    let var = |vars: &HashMap<&str, i64>, k: &str| vars.get(k).copied().unwrap_or(0);
    for op in ops {
        use Op::*;
        acc = match *op {
            Load(v) => v,
            Store(k) => {
                vars.insert(k, acc);
                acc
            }
            LoadVar(k) => var(&vars, k),
            Add(v) => acc.wrapping_add(v),
            AddVar(k) => acc.wrapping_add(var(&vars, k)),
            Subtract(v) => acc.wrapping_sub(v),
            Multiply(v) => acc.wrapping_mul(v),
            Divide(v) => acc.wrapping_div(v),
            Xor(k) => acc ^ var(&vars, k),
            Or(k) => acc | var(&vars, k),
            And(k) => acc & var(&vars, k),
            AndNot(k) => acc & !var(&vars, k),
        };
    }
    acc
}

/// a tiny linear congruential generator, good enough to vary the programs
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn value(&mut self) -> i64 {
        (self.next() % 2001) as i64 - 1000
    }

    fn non_zero(&mut self) -> i64 {
        match self.value() {
            0 => 1,
            v => v,
        }
    }

    fn key(&mut self) -> &'static str {
        ["a", "b", "c"][(self.next() % 3) as usize]
    }
}

#[test]
fn test_straight_line_programs_match_reference() {
    let mut rng = Lcg(7);
    for _ in 0..64 {
        // every slot is written first, so no warnings are emitted
        let mut ops = vec![
            Op::Load(rng.value()),
            Op::Store("a"),
            Op::Load(rng.value()),
            Op::Store("b"),
            Op::Load(rng.value()),
            Op::Store("c"),
        ];
        for _ in 0..16 {
            let op = match rng.next() % 12 {
                0 => Op::Load(rng.value()),
                1 => Op::Store(rng.key()),
                2 => Op::LoadVar(rng.key()),
                3 => Op::Add(rng.value()),
                4 => Op::AddVar(rng.key()),
                5 => Op::Subtract(rng.value()),
                6 => Op::Multiply(rng.value()),
                7 => Op::Divide(rng.non_zero()),
                8 => Op::Xor(rng.key()),
                9 => Op::Or(rng.key()),
                10 => Op::And(rng.key()),
                _ => Op::AndNot(rng.key()),
            };
            ops.push(op);
        }

        let mut src: Vec<String> = ops.iter().map(|op| op.to_line()).collect();
        src.push("HALT".into());
        let src = src.join("\n");
        let harness = Harness::new(hashmap! { "main.acc" => src.as_str() });
        let (res, interp) = harness.run_main();
        assert_eq!(res.unwrap(), RunOutcome::Halted);
        assert_eq!(interp.accumulator, reference_eval(&ops), "program:\n{src}");
        assert!(harness.output().is_empty());
    }
}
