//! Tree-walking interpreter

mod builtins;
mod error;
mod eval;

pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
