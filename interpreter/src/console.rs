use std::io::{self, BufRead, Stdin, Stdout, Write};

use accvm_lib::console::{Console, Output};
use crossterm::style::Stylize;
use crossterm::tty::IsTty;

/// Reads input lines from stdin and writes to stdout. The `<` output marker and the `>`
/// input prompt are coloured if stdout is a terminal.
pub struct TerminalConsole {
    stdin: Stdin,
    stdout: Stdout,
    colored: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        let stdout = io::stdout();
        TerminalConsole {
            colored: stdout.is_tty(),
            stdin: io::stdin(),
            stdout,
        }
    }

    fn marker(&self, marker: &str) -> String {
        if self.colored {
            marker.blue().to_string()
        } else {
            marker.to_string()
        }
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        if self.colored {
            write!(self.stdout, "{} ", ">".green())?;
            self.stdout.flush()?;
        }
        let mut line = String::new();
        let read = self.stdin.lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    }

    fn emit(&mut self, output: Output<'_>) -> io::Result<()> {
        let mut stdout = self.stdout.lock();
        match output {
            Output::Value(v) => writeln!(stdout, "{} {}", self.marker("<"), v),
            Output::Char(c) => writeln!(stdout, "{} {}", self.marker("<"), c),
            Output::Warning(_) if self.colored => writeln!(stdout, "{}", output.to_string().yellow()),
            other => writeln!(stdout, "{}", other),
        }
    }
}
