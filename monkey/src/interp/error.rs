//! Runtime errors for the interpreter
//!
//! A [`RuntimeError`] travels up the `Err` side of [`InterpResult`] and
//! short-circuits evaluation through `?`. The same channel carries the
//! `return` signal ([`ErrorKind::Return`]), which function application and
//! program evaluation catch and unwrap. Whatever else reaches the top level
//! becomes an [`Object::Error`] value.

use crate::object::Object;
use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// Name bound neither in scope nor in the builtin registry
    IdentifierNotFound,
    /// Operands of different types
    TypeMismatch,
    /// Operator not defined for the operand types
    UnknownOperator,
    /// Right operand of `/` or `%` is zero
    DivisionByZero,
    /// Key type has no hash-key derivation
    UnusableHashKey,
    /// Call target is not callable
    NotAFunction,
    /// Subscript on a value that has none
    IndexNotSupported,
    /// Builtin called with the wrong number of arguments
    ArityMismatch,
    /// Builtin called with an argument of the wrong type
    InvalidArgument,
    /// `eval` source failed to parse
    Parser,
    /// `load` could not read or run its module
    Load,
    /// Writing to the output channel failed
    IoError,
    /// Recursion depth limit reached
    StackOverflow,
    /// Control flow: `return` unwinding to the enclosing function
    Return(Box<Object>),
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        // Return carries a payload, but kinds compare by discriminant only
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError { kind, message }
    }

    pub fn identifier_not_found(name: &str) -> Self {
        Self::new(ErrorKind::IdentifierNotFound, format!("identifier not found: {name}"))
    }

    pub fn type_mismatch(left: &str, op: &str, right: &str) -> Self {
        Self::new(ErrorKind::TypeMismatch, format!("type mismatch: {left} {op} {right}"))
    }

    pub fn unknown_infix(left: &str, op: &str, right: &str) -> Self {
        Self::new(ErrorKind::UnknownOperator, format!("unknown operator: {left} {op} {right}"))
    }

    pub fn unknown_prefix(op: &str, operand: &str) -> Self {
        Self::new(ErrorKind::UnknownOperator, format!("unknown operator: {op}{operand}"))
    }

    pub fn division_by_zero(op: &str) -> Self {
        Self::new(ErrorKind::DivisionByZero, format!("the right operand of {op} is 0"))
    }

    pub fn unusable_hash_key(type_name: &str) -> Self {
        Self::new(ErrorKind::UnusableHashKey, format!("unusable as hash key: {type_name}"))
    }

    pub fn not_a_function(type_name: &str) -> Self {
        Self::new(ErrorKind::NotAFunction, format!("not a function: {type_name}"))
    }

    pub fn index_not_supported(type_name: &str) -> Self {
        Self::new(
            ErrorKind::IndexNotSupported,
            format!("index operator not supported: {type_name}"),
        )
    }

    pub fn arity_mismatch(got: usize, want: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("wrong number of arguments. got={got}, want={want}"),
        )
    }

    /// The builtin accepts several types, none of which matched
    pub fn unsupported_argument(builtin: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!("argument to `{builtin}` not supported, got {got}"),
        )
    }

    pub fn wrong_argument_type(builtin: &str, expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!("argument to `{builtin}` must be {expected}, got {got}"),
        )
    }

    /// `details` is the already formatted diagnostic list
    pub fn parser(details: &str) -> Self {
        Self::new(ErrorKind::Parser, format!("parser error: {details}"))
    }

    pub fn load_failed(path: &str) -> Self {
        Self::new(ErrorKind::Load, format!("load {path} failed"))
    }

    pub fn load_inner(path: &str, inner: &str) -> Self {
        Self::new(
            ErrorKind::Load,
            format!("load {path} failed. Inner error is: {inner}"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::IoError, format!("IO error: {msg}"))
    }

    pub fn stack_overflow() -> Self {
        Self::new(ErrorKind::StackOverflow, "stack overflow: too deep recursion".to_string())
    }

    /// Wrap a `return` value so it can unwind through `?`
    pub fn return_value(value: Object) -> Self {
        Self::new(ErrorKind::Return(Box::new(value)), "return outside of function".to_string())
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
