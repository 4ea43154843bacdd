use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;

use interpreter::{InterpretError, Interpreter, MixedAddition, Options};

const EXIT_COMPILE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;

/// Tree-walking interpreter for Lox expressions and print statements.
#[derive(clap::Parser)]
struct Args {
    /// Script to run. Without it, starts an interactive prompt.
    file: Option<PathBuf>,

    /// Print the scanned tokens before running.
    #[arg(long)]
    tokens: bool,

    /// Print each parsed statement in prefix form before running.
    #[arg(long)]
    ast: bool,

    /// Let `+` stringify a number paired with a string instead of failing.
    #[arg(long)]
    stringify_mixed_addition: bool,
}

struct Lox {
    interpreter: Interpreter,
    dump_tokens: bool,
    dump_ast: bool,
}

impl Lox {
    fn new(args: &Args) -> Self {
        let mixed_addition =
            if args.stringify_mixed_addition { MixedAddition::Stringify } else { MixedAddition::Reject };
        Self {
            interpreter: Interpreter::new(Options { mixed_addition }),
            dump_tokens: args.tokens,
            dump_ast: args.ast,
        }
    }

    fn run(&self, source: &str) -> Result<(), InterpretError> {
        if self.dump_tokens || self.dump_ast {
            let (tokens, _) = scanner::scan(source);
            if self.dump_tokens {
                println!("{}", tokens.iter().map(|t| t.describe()).join("\n"));
            }
            if self.dump_ast {
                let (stmts, _) = parser::parse(tokens);
                println!("{}", stmts.iter().join("\n"));
            }
        }

        self.interpreter.run_source(source, &mut stdout())
    }
}

fn run_file(path: PathBuf, lox: &Lox) -> anyhow::Result<ExitCode> {
    let source =
        std::fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))?;

    match lox.run(&source) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(InterpretError::CompileError(errors)) => {
            eprintln!("{errors}");
            Ok(ExitCode::from(EXIT_COMPILE_ERROR))
        }
        Err(InterpretError::RuntimeError(error)) => {
            eprintln!("{error}");
            Ok(ExitCode::from(EXIT_RUNTIME_ERROR))
        }
        Err(e @ InterpretError::Io(_)) => Err(e.into()),
    }
}

fn run_prompt(lox: &Lox) -> anyhow::Result<ExitCode> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }

        match lox.run(&line) {
            Ok(()) => (),
            Err(e @ InterpretError::Io(_)) => return Err(e.into()),
            Err(e) => eprintln!("{}", e),
        }
    }

    log::debug!("Leaving prompt");
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let lox = Lox::new(&args);

    match args.file {
        Some(file) => run_file(file, &lox),
        None => run_prompt(&lox),
    }
}
