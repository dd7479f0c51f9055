use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use accvm_lib::config::{Config, TraceMode};
use accvm_lib::loader::FsReader;
use accvm_lib::vm::{Interpreter, Session};

use std::path::PathBuf;

mod console;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// the program to run
    script: PathBuf,

    /// print every instruction together with the accumulator before executing it
    #[arg(short, long)]
    debug: bool,

    /// collect the same trace as --debug and write it to dryrun.txt on HALT
    #[arg(short = 'r', long)]
    dry_run: bool,

    #[cfg(feature = "dev")]
    #[arg(short = 'p', long)]
    show_program: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config {
        trace: TraceMode::from_flags(cli.debug, cli.dry_run),
        ..Config::default()
    };
    let session = Session::new(&config, FsReader, console::TerminalConsole::new());
    let script = cli.script.to_string_lossy();
    let mut interp =
        Interpreter::load(session, &script).context(format!("loading {}", script))?;

    #[cfg(feature = "dev")]
    if cli.show_program {
        println!("{:#?}", interp.program());
        return Ok(());
    }

    let res = match interp.run() {
        Ok(outcome) => {
            tracing::debug!(?outcome, "program finished");
            0
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            1
        }
    };
    std::process::exit(res);
}
