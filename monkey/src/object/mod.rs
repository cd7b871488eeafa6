//! Runtime object model
//!
//! Every value a Monkey program can produce is an [`Object`]. Scalars are held
//! inline; strings, arrays, hashes and functions sit behind `Rc` so that passing
//! them around is a pointer copy. Booleans and null are compared by value, so
//! the constants [`TRUE`], [`FALSE`] and [`NULL`] are the canonical instances.

mod env;
mod hash;
mod string;

pub use env::{child_env, release_frame, EnvRef, Environment};
pub use hash::{Hash, HashKey, HashPair, KeyKind};
pub use string::MonkeyString;

use crate::ast::Block;
use crate::interp::{InterpResult, Interpreter};
use std::fmt;
use std::rc::Rc;

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

/// Native function signature shared by every builtin
pub type BuiltinFn = fn(&mut Interpreter, &EnvRef, Vec<Object>) -> InterpResult<Object>;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Null,
    Str(Rc<MonkeyString>),
    Array(Rc<Vec<Object>>),
    Hash(Rc<Hash>),
    Function(Rc<Function>),
    Builtin(Builtin),
    /// Error that escaped to the top level
    Error(String),
}

/// User function: a literal closed over its defining environment
pub struct Function {
    pub params: Rc<[String]>,
    pub body: Rc<Block>,
    pub env: EnvRef,
}

/// Named native function
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Object {
    /// Canonical boolean for a native bool
    pub fn from_bool(b: bool) -> Object {
        if b { TRUE } else { FALSE }
    }

    /// String object from the raw text of a literal
    pub fn string_literal(raw: &str) -> Object {
        Object::Str(Rc::new(MonkeyString::from_literal(raw)))
    }

    /// String object from computed content
    pub fn string_from(text: impl Into<Vec<u8>>) -> Object {
        Object::Str(Rc::new(MonkeyString::from_bytes(text.into())))
    }

    pub fn array(elements: Vec<Object>) -> Object {
        Object::Array(Rc::new(elements))
    }

    /// Type tag used in error messages and by the `type` builtin
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::Str(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Error(_) => "ERROR",
        }
    }

    /// Only `false` and `null` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Hash-key derivation; `None` for types that cannot key a hash
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(n) => Some(HashKey::new(KeyKind::Integer, *n as u64)),
            Object::Boolean(b) => Some(HashKey::new(KeyKind::Boolean, u64::from(*b))),
            Object::Str(s) => Some(HashKey::new(KeyKind::String, s.hash_value())),
            _ => None,
        }
    }

    /// Display rendering as a `String`
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{n}"),
            Object::Boolean(b) => write!(f, "{b}"),
            Object::Null => write!(f, "null"),
            Object::Str(s) => write!(f, "{}", s.literal()),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => write!(f, "{hash}"),
            Object::Function(func) => write!(f, "{func}"),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {{\n{}\n}}", self.params.join(", "), self.body)
    }
}

// The captured environment may contain this very function
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}
