use std::{fmt::Display, ops::Deref};

use cursor::Line;
use itertools::Itertools;

/// Exit status for input that failed to scan or parse (`EX_DATAERR`).
pub const EXIT_SYNTAX_ERROR: i32 = 65;
/// Exit status for input that failed during evaluation (`EX_SOFTWARE`).
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Where in the token stream a syntax error was detected.
#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    AtEnd,
    At(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Diagnostic {
    #[error("[line {line}] Error: {message}")]
    Lexical { line: Line, message: String },
    #[error("[line {line}] Error{location}: {message}")]
    Syntax { line: Line, location: Location, message: String },
    #[error("{message}\n[line {line}]")]
    Runtime { line: Line, message: String },
}

impl Diagnostic {
    pub fn is_runtime(&self) -> bool {
        matches!(self, Diagnostic::Runtime { .. })
    }
}

/// Everything reported during one run of the pipeline over one input unit.
///
/// The two flags are sticky: once set they stay set for the lifetime of the
/// collector. Callers that want a fresh scope (e.g. per REPL line) create a new
/// collector.
#[derive(Debug, Default, PartialEq)]
pub struct Diagnostics {
    reported: Vec<Diagnostic>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: impl Into<Diagnostic>) -> &Diagnostic {
        let diagnostic = diagnostic.into();
        log::debug!("Reporting {:?}", diagnostic);

        if diagnostic.is_runtime() {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }

        self.reported.push(diagnostic);
        &self.reported[self.reported.len() - 1]
    }

    /// Set by lexical and syntax diagnostics.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn exit_code(&self) -> i32 {
        if self.had_error {
            EXIT_SYNTAX_ERROR
        } else if self.had_runtime_error {
            EXIT_RUNTIME_ERROR
        } else {
            0
        }
    }
}

impl Deref for Diagnostics {
    type Target = [Diagnostic];

    fn deref(&self) -> &Self::Target {
        &self.reported
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.reported.iter().join("\n"))
    }
}
