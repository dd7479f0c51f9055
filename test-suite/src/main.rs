use anyhow::{anyhow, Context, Result};
use glob::glob;
use std::result::Result as StdResult;

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use std::io::Write;

/// Every `tests/<name>.acc` is run from within the tests directory, with
/// `tests/<name>.in` as stdin if it exists. Its stdout must equal `tests/<name>.out`.
fn main() -> Result<()> {
    compile_accvm().context("compiling interpreter")?;
    let binary = fs::canonicalize("../target/release/accvm").context("locating accvm")?;

    let scripts: Vec<_> = glob("tests/*.acc")?.collect::<StdResult<_, _>>()?;
    let mut failures = 0;
    for script in &scripts {
        let expected_path = script.with_extension("out");
        let expected_output = fs::read_to_string(&expected_path)
            .context(format!("loading expected output: {}", expected_path.display()))?;
        let input = match fs::read_to_string(script.with_extension("in")) {
            Ok(input) => input,
            Err(_) => String::new(),
        };
        let output = run_script(&binary, script, &input)
            .context(format!("running script {}", script.display()))?;
        if output == expected_output {
            println!("{}: passed", script.display());
        } else {
            failures += 1;
            println!("{}: failed\nactual output:\n{}", script.display(), output);
        }
    }

    if failures > 0 {
        Err(anyhow!("{} of {} scripts failed", failures, scripts.len()))
    } else {
        Ok(())
    }
}

fn run_script(binary: &Path, script: &Path, input: &str) -> Result<String> {
    let file_name = script
        .file_name()
        .ok_or_else(|| anyhow!("not a file: {}", script.display()))?;
    let mut child = Command::new(binary)
        .arg(file_name)
        .current_dir("tests")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    Ok(String::from_utf8(output.stdout)?)
}

fn compile_accvm() -> Result<()> {
    let st = Command::new("cargo")
        .args(["build", "--release", "-p", "accvm"])
        .current_dir("..")
        .status()?;
    if st.success() {
        Ok(())
    } else {
        Err(anyhow!("compiling the interpreter failed"))
    }
}
