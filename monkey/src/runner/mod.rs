//! Program runner
//!
//! Runs a complete source text once: parse, stop on diagnostics, otherwise
//! evaluate in the given environment. Both the CLI and the REPL go through
//! [`run`].

use crate::interp::Interpreter;
use crate::ast::Statement;
use crate::object::{EnvRef, Object};
use crate::parser::{self, ParseError};
use tracing::debug;

/// Result of running a program
#[derive(Debug)]
pub enum Outcome {
    /// The source did not parse; nothing was evaluated
    ParseErrors(Vec<ParseError>),
    /// Final value of the program, possibly an error object
    Value(Object),
    /// The program ended with a `let`, so there is no value to show
    Binding,
}

impl Outcome {
    /// Text the batch runner prints, `None` for a `null` result
    pub fn render(&self) -> Option<String> {
        match self {
            Outcome::ParseErrors(errors) => Some(format_parse_errors(errors, 1)),
            Outcome::Value(value) if value.is_null() => None,
            Outcome::Value(value) => Some(value.inspect()),
            Outcome::Binding => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        match self {
            Outcome::ParseErrors(_) => true,
            Outcome::Value(value) => value.is_error(),
            Outcome::Binding => false,
        }
    }
}

/// Numbered diagnostic list: ` parse error[i/n]: msg` lines joined by `\n`,
/// counting from `first`. Programs count from 1, nested `eval`/`load`
/// sources from 0.
pub fn format_parse_errors(errors: &[ParseError], first: usize) -> String {
    let total = errors.len();
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!(" parse error[{}/{total}]: {}", i + first, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse and evaluate `source` in `env`
pub fn run(interp: &mut Interpreter, source: &str, env: &EnvRef) -> Outcome {
    let (program, errors) = parser::parse_source(source);
    if !errors.is_empty() {
        debug!(errors = errors.len(), "program failed to parse");
        return Outcome::ParseErrors(errors);
    }
    debug!(statements = program.statements.len(), "evaluating program");
    let value = interp.eval_program(&program, env);
    debug!(result = value.type_name(), "program finished");
    let ends_in_let = matches!(program.statements.last(), Some(Statement::Let { .. }));
    if ends_in_let && value.is_null() {
        Outcome::Binding
    } else {
        Outcome::Value(value)
    }
}
