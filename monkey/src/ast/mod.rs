//! Abstract Syntax Tree definitions
//!
//! The `Display` rendering of every node is valid Monkey source: parsing the
//! rendered text yields a tree that evaluates the same way. Function objects
//! rely on this when they print their bodies.

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::Serialize;
use std::fmt;

/// A program is a sequence of statements
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// `let name = value;`
    Let { name: String, value: Expr },
    /// `return value;`
    Return(Expr),
    /// Bare expression with an optional terminator
    Expression(Expr),
}

/// Brace-delimited statement sequence, the body of `if` branches and functions
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Statement]) -> fmt::Result {
    for (i, stmt) in statements.iter().enumerate() {
        if i > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{stmt}")?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value}"),
            Statement::Return(value) => write!(f, "return {value}"),
            Statement::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_display_joins_statements() {
        let program = Program {
            statements: vec![
                Statement::Let {
                    name: "myVar".into(),
                    value: Expr::Ident("anotherVar".into()),
                },
                Statement::Return(Expr::IntLit(5)),
            ],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar; return 5");
    }

    #[test]
    fn test_empty_block_display() {
        assert_eq!(Block::default().to_string(), "");
    }

    #[test]
    fn test_program_serializes_to_json() {
        let program = Program {
            statements: vec![Statement::Expression(Expr::BoolLit(true))],
        };
        let json = serde_json::to_string(&program).unwrap();
        assert_eq!(json, r#"{"statements":[{"Expression":{"BoolLit":true}}]}"#);
    }
}
