use std::io::{self, BufRead, Write};

use itertools::Itertools;

pub use diagnostics::{Diagnostic, Diagnostics};
use interpreter::Interpreter;
use scanner::Scanner;

/// Line that ends an interactive session.
pub const EXIT_COMMAND: &str = "exit()";

/// What to do with a source once it is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Print every token, one per line.
    Tokenize,
    /// Print the parsed expression in prefix form.
    Parse,
    /// Print the value of the parsed expression.
    #[default]
    Evaluate,
}

#[derive(Debug, Clone, Default)]
pub struct Lox {
    mode: Mode,
}

impl Lox {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Runs one input unit through the pipeline.
    ///
    /// Results go to `output`. Lexical and syntax diagnostics go to `errors`.
    /// Runtime diagnostics are part of the evaluation result and so go to
    /// `output`. Every call starts from a fresh [`Diagnostics`] and returns it,
    /// so the caller can derive the exit status.
    pub fn run_source(
        &self,
        source: &str,
        output: &mut impl Write,
        errors: &mut impl Write,
    ) -> io::Result<Diagnostics> {
        log::debug!("Running {:?} over {} bytes", self.mode, source.len());
        let mut diagnostics = Diagnostics::new();

        let scanned = Scanner::new(source).scan_tokens();
        for error in scanned.errors {
            writeln!(errors, "{}", diagnostics.report(error))?;
        }

        if self.mode == Mode::Tokenize {
            writeln!(output, "{}", scanned.tokens.iter().join("\n"))?;
            return Ok(diagnostics);
        }

        let expr = match parser::parse(&scanned.tokens) {
            Ok(expr) => expr,
            Err(error) => {
                writeln!(errors, "{}", diagnostics.report(error))?;
                return Ok(diagnostics);
            }
        };

        // Lexical errors suppress output even when the remaining tokens parse
        if diagnostics.had_error() {
            return Ok(diagnostics);
        }

        match self.mode {
            Mode::Parse => writeln!(output, "{}", expr)?,
            Mode::Evaluate => match Interpreter::new().evaluate(&expr) {
                Ok(value) => writeln!(output, "{}", value)?,
                Err(error) => writeln!(output, "{}", diagnostics.report(error))?,
            },
            Mode::Tokenize => (),
        }

        Ok(diagnostics)
    }

    /// Reads `input` line by line, running each line as its own input unit
    /// until end of input or [`EXIT_COMMAND`]. Errors on one line never affect
    /// the next one.
    pub fn run_prompt(
        &self,
        input: impl BufRead,
        output: &mut impl Write,
        errors: &mut impl Write,
    ) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(output, "> ")?;
            output.flush()?;

            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            if line.trim() == EXIT_COMMAND {
                return Ok(());
            }

            let diagnostics = self.run_source(&line, output, errors)?;
            log::trace!("Line finished with exit code {}", diagnostics.exit_code());
        }
    }
}
