//! Monkey interpreter CLI

use clap::Parser;
use monkey::error::{report_parse_errors, MonkeyError, Result};
use monkey::interp::Interpreter;
use monkey::object::{Environment, Object};
use monkey::repl::Repl;
use monkey::runner::{self, Outcome};
use std::path::{Path, PathBuf};
use std::sync::Once;

#[derive(Parser)]
#[command(name = "monkey", version, about = "Monkey - run a program or start the REPL")]
struct Cli {
    /// Source file to run
    path: Option<PathBuf>,

    /// Source file to run
    #[arg(short = 'f', value_name = "FILE")]
    file: Option<PathBuf>,

    /// Program text to run
    #[arg(short = 'c', value_name = "CODE")]
    code: Option<String>,

    /// Dump tokens instead of running (debug)
    #[arg(long)]
    tokens: bool,

    /// Dump the AST as JSON instead of running (debug)
    #[arg(long)]
    ast: bool,
}

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match source_of(&cli) {
        Ok(Some((name, source))) => {
            if cli.tokens {
                dump_tokens(&source)
            } else if cli.ast {
                dump_ast(&name, &source)
            } else {
                run_program(&name, &source)
            }
        }
        Ok(None) => Repl::new().and_then(|mut repl| repl.run()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_program_failure() => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Program name and text: `-c` first, then `-f`, then the positional path
fn source_of(cli: &Cli) -> Result<Option<(String, String)>> {
    if let Some(code) = &cli.code {
        return Ok(Some(("<code>".to_string(), code.clone())));
    }
    match cli.file.as_deref().or(cli.path.as_deref()) {
        Some(path) => Ok(Some((path.display().to_string(), read_source(path)?))),
        None => Ok(None),
    }
}

fn read_source(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

fn run_program(name: &str, source: &str) -> Result<()> {
    let mut interp = Interpreter::new();
    let env = Environment::new().into_ref();
    let outcome = runner::run(&mut interp, source, &env);

    if let Some(text) = outcome.render() {
        println!("{text}");
    }

    match outcome {
        Outcome::ParseErrors(errors) => {
            report_parse_errors(name, source, &errors)?;
            Err(MonkeyError::parse(&errors))
        }
        Outcome::Value(Object::Error(message)) => Err(MonkeyError::runtime(message)),
        Outcome::Value(_) | Outcome::Binding => Ok(()),
    }
}

fn dump_tokens(source: &str) -> Result<()> {
    for (tok, span) in monkey::lexer::tokenize(source) {
        println!("{tok:?} @ {span}");
    }
    Ok(())
}

fn dump_ast(name: &str, source: &str) -> Result<()> {
    let (program, errors) = monkey::parser::parse_source(source);
    if !errors.is_empty() {
        report_parse_errors(name, source, &errors)?;
        return Err(MonkeyError::parse(&errors));
    }
    println!("{}", serde_json::to_string_pretty(&program)?);
    Ok(())
}
