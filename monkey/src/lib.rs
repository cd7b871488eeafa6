//! Monkey Language Library
//!
//! A small expression-oriented language: logos lexer, Pratt parser and a
//! tree-walking interpreter with closures, arrays, hashes and builtins.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod runner;

pub use ast::Span;
pub use error::{MonkeyError, Result};
