//! Builtin functions
//!
//! Each builtin receives the interpreter, the caller's environment and the
//! evaluated arguments. Collections are never mutated in place: `rest`,
//! `push`, `set` and `delete` return new values.

use super::error::{InterpResult, RuntimeError};
use super::Interpreter;
use crate::object::{release_frame, EnvRef, Environment, Hash, Object, NULL, TRUE};
use std::fs;
use std::rc::Rc;
use tracing::debug;

fn check_arity(args: &[Object], want: usize) -> InterpResult<()> {
    if args.len() != want {
        return Err(RuntimeError::arity_mismatch(args.len(), want));
    }
    Ok(())
}

fn expect_array<'a>(name: &str, arg: &'a Object) -> InterpResult<&'a Rc<Vec<Object>>> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(RuntimeError::wrong_argument_type(name, "ARRAY", other.type_name())),
    }
}

fn expect_hash<'a>(name: &str, arg: &'a Object) -> InterpResult<&'a Hash> {
    match arg {
        Object::Hash(hash) => Ok(hash.as_ref()),
        other => Err(RuntimeError::wrong_argument_type(name, "HASH", other.type_name())),
    }
}

/// Decoded text of a string argument
fn expect_string(name: &str, arg: &Object) -> InterpResult<String> {
    match arg {
        Object::Str(s) => Ok(s.to_text()),
        other => Err(RuntimeError::wrong_argument_type(name, "STRING", other.type_name())),
    }
}

/// len(x) -> Integer
pub(super) fn builtin_len(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    let n = match &args[0] {
        Object::Str(s) => s.len(),
        Object::Array(elements) => elements.len(),
        Object::Hash(hash) => hash.len(),
        other => return Err(RuntimeError::unsupported_argument("len", other.type_name())),
    };
    Ok(Object::Integer(n as i64))
}

pub(super) fn builtin_first(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    let elements = expect_array("first", &args[0])?;
    Ok(elements.first().cloned().unwrap_or(NULL))
}

pub(super) fn builtin_last(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    let elements = expect_array("last", &args[0])?;
    Ok(elements.last().cloned().unwrap_or(NULL))
}

/// rest(arr): every element but the first, `null` for an empty array
pub(super) fn builtin_rest(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    let elements = expect_array("rest", &args[0])?;
    match elements.split_first() {
        Some((_, tail)) => Ok(Object::array(tail.to_vec())),
        None => Ok(NULL),
    }
}

pub(super) fn builtin_push(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 2)?;
    let elements = expect_array("push", &args[0])?;
    let mut pushed = Vec::with_capacity(elements.len() + 1);
    pushed.extend(elements.iter().cloned());
    pushed.push(args[1].clone());
    Ok(Object::array(pushed))
}

/// set(hash, key, value) -> new Hash
pub(super) fn builtin_set(_: &mut Interpreter, _: &EnvRef, mut args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 3)?;
    let value = args.pop().unwrap_or(NULL);
    let key = args.pop().unwrap_or(NULL);
    let hash = expect_hash("set", &args[0])?;
    Ok(Object::Hash(Rc::new(hash.with_set(key, value)?)))
}

pub(super) fn builtin_contains(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 2)?;
    let hash = expect_hash("contains", &args[0])?;
    Ok(Object::from_bool(hash.get(&args[1])?.is_some()))
}

/// delete(hash, key) -> new Hash
pub(super) fn builtin_delete(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 2)?;
    let hash = expect_hash("delete", &args[0])?;
    Ok(Object::Hash(Rc::new(hash.with_deleted(&args[1])?)))
}

pub(super) fn builtin_puts(interp: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    let out = interp.output();
    for arg in &args {
        writeln!(out, "{arg}").map_err(|e| RuntimeError::io_error(&e.to_string()))?;
    }
    out.flush().map_err(|e| RuntimeError::io_error(&e.to_string()))?;
    Ok(NULL)
}

/// eval(src): run source text in a fresh environment
pub(super) fn builtin_eval(interp: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    let source = expect_string("eval", &args[0])?;
    debug!(len = source.len(), "eval builtin");
    let scope = Environment::new().into_ref();
    let result = interp.eval_source(&source, &scope);
    release_frame(&scope);
    result
}

/// load(path): run a file and merge its top-level bindings into the caller's scope
pub(super) fn builtin_load(interp: &mut Interpreter, env: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    let path = expect_string("load", &args[0])?;
    let source = fs::read_to_string(&path).map_err(|e| {
        debug!(%path, error = %e, "load could not read module");
        RuntimeError::load_failed(&path)
    })?;

    let module_env = Environment::new().into_ref();
    interp
        .eval_source(&source, &module_env)
        .map_err(|e| RuntimeError::load_inner(&path, &e.message))?;

    {
        let module = module_env.borrow();
        debug!(%path, bindings = module.local_count(), "merging loaded module");
        env.borrow_mut().merge(&module);
    }
    release_frame(&module_env);
    Ok(TRUE)
}

/// type(x) -> type tag as String
pub(super) fn builtin_type(_: &mut Interpreter, _: &EnvRef, args: Vec<Object>) -> InterpResult<Object> {
    check_arity(&args, 1)?;
    Ok(Object::string_from(args[0].type_name()))
}
