use std::{
    io::{stderr, stdin, stdout},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use lox::{Lox, Mode};

#[derive(clap::Parser)]
#[command(about = "Scan, parse and evaluate Lox expressions")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tokens of a file
    Tokenize { file: PathBuf },
    /// Print the expression in a file in prefix form
    Parse { file: PathBuf },
    /// Print the value of the expression in a file
    Evaluate { file: PathBuf },
    /// Run expressions interactively, one per line
    Repl {
        #[arg(long, value_enum, default_value_t = ModeArg::Evaluate)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Tokenize,
    Parse,
    Evaluate,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Tokenize => Mode::Tokenize,
            ModeArg::Parse => Mode::Parse,
            ModeArg::Evaluate => Mode::Evaluate,
        }
    }
}

fn run_file(path: PathBuf, mode: Mode) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let diagnostics = Lox::new(mode).run_source(&source, &mut stdout(), &mut stderr())?;
    let exit_code = diagnostics.exit_code();
    if exit_code != 0 {
        log::debug!("{} finished with {} diagnostic(s)", path.display(), diagnostics.len());
        std::process::exit(exit_code);
    }
    Ok(())
}

fn run_prompt(mode: Mode) -> anyhow::Result<()> {
    Lox::new(mode).run_prompt(stdin().lock(), &mut stdout(), &mut stderr())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Some(Command::Tokenize { file }) => run_file(file, Mode::Tokenize),
        Some(Command::Parse { file }) => run_file(file, Mode::Parse),
        Some(Command::Evaluate { file }) => run_file(file, Mode::Evaluate),
        Some(Command::Repl { mode }) => run_prompt(mode.into()),
        None => run_prompt(Mode::default()),
    }
}
