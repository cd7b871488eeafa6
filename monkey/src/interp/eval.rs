//! Expression evaluator

use super::builtins;
use super::error::{ErrorKind, InterpResult, RuntimeError};
use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Statement};
use crate::object::{
    child_env, release_frame, Builtin, BuiltinFn, EnvRef, Function, Hash, MonkeyString, Object, NULL,
};
use crate::parser;
use crate::runner::format_parse_errors;
use rustc_hash::FxHashMap;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::debug;

/// Maximum depth of nested user function calls
const MAX_RECURSION_DEPTH: usize = 100_000;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// The interpreter
pub struct Interpreter {
    /// Builtin functions, consulted after the environment chain
    builtins: FxHashMap<&'static str, Builtin>,
    /// Destination of `puts`
    output: Box<dyn Write>,
    /// Current depth of user function calls
    recursion_depth: usize,
    /// Depth at which calls fail with a stack overflow
    max_depth: usize,
}

impl Interpreter {
    /// Create an interpreter writing to stdout
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter writing `puts` output to `output`
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let mut interp = Interpreter {
            builtins: FxHashMap::default(),
            output,
            recursion_depth: 0,
            max_depth: MAX_RECURSION_DEPTH,
        };
        interp.register_builtins();
        interp
    }

    fn register_builtins(&mut self) {
        self.register("len", builtins::builtin_len);
        self.register("first", builtins::builtin_first);
        self.register("last", builtins::builtin_last);
        self.register("rest", builtins::builtin_rest);
        self.register("push", builtins::builtin_push);
        self.register("set", builtins::builtin_set);
        self.register("contains", builtins::builtin_contains);
        self.register("delete", builtins::builtin_delete);
        self.register("puts", builtins::builtin_puts);
        self.register("eval", builtins::builtin_eval);
        self.register("load", builtins::builtin_load);
        self.register("type", builtins::builtin_type);
    }

    fn register(&mut self, name: &'static str, func: BuiltinFn) {
        self.builtins.insert(name, Builtin { name, func });
    }

    /// Output channel used by `puts`
    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    /// Evaluate a program, folding an escaping error into an error object
    pub fn eval_program(&mut self, program: &Program, env: &EnvRef) -> Object {
        match self.run_program(program, env) {
            Ok(value) => value,
            Err(err) => Object::Error(err.message),
        }
    }

    /// Evaluate a program; a top-level `return` yields its value
    pub fn run_program(&mut self, program: &Program, env: &EnvRef) -> InterpResult<Object> {
        let mut result = NULL;
        for stmt in &program.statements {
            match self.eval_statement(stmt, env) {
                Ok(value) => result = value,
                Err(RuntimeError {
                    kind: ErrorKind::Return(value),
                    ..
                }) => return Ok(*value),
                Err(err) => return Err(err),
            }
        }
        Ok(result)
    }

    /// Parse and run `source` in `env`, as `eval` and `load` do
    pub fn eval_source(&mut self, source: &str, env: &EnvRef) -> InterpResult<Object> {
        let (program, errors) = parser::parse_source(source);
        if !errors.is_empty() {
            debug!(errors = errors.len(), "nested source failed to parse");
            return Err(RuntimeError::parser(&format_parse_errors(&errors, 0)));
        }
        debug!(statements = program.statements.len(), "evaluating nested source");
        self.run_program(&program, env)
    }

    fn eval_block(&mut self, block: &Block, env: &EnvRef) -> InterpResult<Object> {
        let mut result = NULL;
        for stmt in &block.statements {
            result = self.eval_statement(stmt, env)?;
        }
        Ok(result)
    }

    fn eval_statement(&mut self, stmt: &Statement, env: &EnvRef) -> InterpResult<Object> {
        match stmt {
            Statement::Let { name, value } => {
                let value = self.eval_expr(value, env)?;
                env.borrow_mut().define(name.clone(), value);
                Ok(NULL)
            }
            Statement::Return(expr) => {
                let value = self.eval_expr(expr, env)?;
                Err(RuntimeError::return_value(value))
            }
            Statement::Expression(expr) => self.eval_expr(expr, env),
        }
    }

    /// Evaluate an expression with automatic stack growth for deep recursion
    pub fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> InterpResult<Object> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Expr, env: &EnvRef) -> InterpResult<Object> {
        match expr {
            Expr::IntLit(n) => Ok(Object::Integer(*n)),
            Expr::BoolLit(b) => Ok(Object::from_bool(*b)),
            Expr::StringLit(raw) => Ok(Object::string_literal(raw)),
            Expr::Ident(name) => self.eval_ident(name, env),

            Expr::Prefix { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                eval_prefix(*op, value)
            }

            Expr::Infix {
                op: InfixOp::And,
                left,
                right,
            } => {
                if !self.eval_expr(left, env)?.is_truthy() {
                    return Ok(Object::from_bool(false));
                }
                Ok(Object::from_bool(self.eval_expr(right, env)?.is_truthy()))
            }
            Expr::Infix {
                op: InfixOp::Or,
                left,
                right,
            } => {
                if self.eval_expr(left, env)?.is_truthy() {
                    return Ok(Object::from_bool(true));
                }
                Ok(Object::from_bool(self.eval_expr(right, env)?.is_truthy()))
            }
            Expr::Infix { op, left, right } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                eval_infix(*op, &left, &right)
            }

            Expr::If {
                cond,
                consequence,
                alternative,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block(alt, env)
                } else {
                    Ok(NULL)
                }
            }

            Expr::FnLit { params, body } => Ok(Object::Function(Rc::new(Function {
                params: params.iter().cloned().collect(),
                body: Rc::clone(body),
                env: Rc::clone(env),
            }))),

            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee, env)?;
                let args = self.eval_exprs(args, env)?;
                self.apply_function(callee, args, env)
            }

            Expr::Array(elements) => Ok(Object::array(self.eval_exprs(elements, env)?)),

            Expr::Hash(pairs) => self.eval_hash_literal(pairs, env),

            Expr::Index { collection, index } => {
                let collection = self.eval_expr(collection, env)?;
                let index = self.eval_expr(index, env)?;
                eval_index(&collection, &index)
            }
        }
    }

    fn eval_ident(&self, name: &str, env: &EnvRef) -> InterpResult<Object> {
        if let Some(value) = env.borrow().get(name) {
            return Ok(value);
        }
        self.builtins
            .get(name)
            .map(|b| Object::Builtin(*b))
            .ok_or_else(|| RuntimeError::identifier_not_found(name))
    }

    /// Evaluate left to right, stopping at the first error
    fn eval_exprs(&mut self, exprs: &[Expr], env: &EnvRef) -> InterpResult<Vec<Object>> {
        exprs.iter().map(|e| self.eval_expr(e, env)).collect()
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expr, Expr)], env: &EnvRef) -> InterpResult<Object> {
        let mut hash = Hash::new();
        for (key_expr, value_expr) in pairs {
            let key = self.eval_expr(key_expr, env)?;
            if key.hash_key().is_none() {
                return Err(RuntimeError::unusable_hash_key(key.type_name()));
            }
            let value = self.eval_expr(value_expr, env)?;
            hash.set(key, value)?;
        }
        Ok(Object::Hash(Rc::new(hash)))
    }

    /// Apply a function or builtin to evaluated arguments
    #[tracing::instrument(level = "trace", skip_all, fields(callee = callee.type_name(), argc = args.len() as u64))]
    pub fn apply_function(&mut self, callee: Object, args: Vec<Object>, env: &EnvRef) -> InterpResult<Object> {
        match callee {
            Object::Function(func) => self.call_function(&func, args),
            Object::Builtin(builtin) => (builtin.func)(self, env, args),
            other => Err(RuntimeError::not_a_function(other.type_name())),
        }
    }

    fn call_function(&mut self, func: &Function, args: Vec<Object>) -> InterpResult<Object> {
        self.recursion_depth += 1;
        if self.recursion_depth > self.max_depth {
            self.recursion_depth -= 1;
            return Err(RuntimeError::stack_overflow());
        }

        let func_env = child_env(&func.env);
        {
            let mut scope = func_env.borrow_mut();
            // extra arguments are dropped, missing ones stay unbound
            for (param, arg) in func.params.iter().zip(args) {
                scope.define(param.clone(), arg);
            }
        }

        let result = match self.eval_block(&func.body, &func_env) {
            Err(RuntimeError {
                kind: ErrorKind::Return(value),
                ..
            }) => Ok(*value),
            other => other,
        };
        self.recursion_depth -= 1;
        release_frame(&func_env);
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix(op: PrefixOp, operand: Object) -> InterpResult<Object> {
    match (op, &operand) {
        (PrefixOp::Not, _) => Ok(Object::from_bool(!operand.is_truthy())),
        (PrefixOp::Neg, Object::Integer(n)) => Ok(Object::Integer(n.wrapping_neg())),
        (PrefixOp::Neg, _) => Err(RuntimeError::unknown_prefix(op.as_str(), operand.type_name())),
    }
}

fn eval_infix(op: InfixOp, left: &Object, right: &Object) -> InterpResult<Object> {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(op, *l, *r),
        (Object::Str(l), Object::Str(r)) => eval_string_infix(op, l, r),
        (Object::Boolean(l), Object::Boolean(r)) => match op {
            InfixOp::Eq => Ok(Object::from_bool(l == r)),
            InfixOp::NotEq => Ok(Object::from_bool(l != r)),
            _ => Err(unknown_infix(op, left, right)),
        },
        _ if left.type_name() != right.type_name() => Err(RuntimeError::type_mismatch(
            left.type_name(),
            op.as_str(),
            right.type_name(),
        )),
        _ => Err(unknown_infix(op, left, right)),
    }
}

fn unknown_infix(op: InfixOp, left: &Object, right: &Object) -> RuntimeError {
    RuntimeError::unknown_infix(left.type_name(), op.as_str(), right.type_name())
}

fn eval_integer_infix(op: InfixOp, l: i64, r: i64) -> InterpResult<Object> {
    let value = match op {
        InfixOp::Add => Object::Integer(l.wrapping_add(r)),
        InfixOp::Sub => Object::Integer(l.wrapping_sub(r)),
        InfixOp::Mul => Object::Integer(l.wrapping_mul(r)),
        InfixOp::Div | InfixOp::Mod if r == 0 => {
            return Err(RuntimeError::division_by_zero(op.as_str()));
        }
        InfixOp::Div => Object::Integer(l.wrapping_div(r)),
        InfixOp::Mod => Object::Integer(l.wrapping_rem(r)),
        InfixOp::Lt => Object::from_bool(l < r),
        InfixOp::Gt => Object::from_bool(l > r),
        InfixOp::Eq => Object::from_bool(l == r),
        InfixOp::NotEq => Object::from_bool(l != r),
        InfixOp::And | InfixOp::Or => {
            return Err(RuntimeError::unknown_infix("INTEGER", op.as_str(), "INTEGER"));
        }
    };
    Ok(value)
}

fn eval_string_infix(op: InfixOp, l: &MonkeyString, r: &MonkeyString) -> InterpResult<Object> {
    match op {
        InfixOp::Add => Ok(Object::Str(Rc::new(l.concat(r)))),
        InfixOp::Lt => Ok(Object::from_bool(l.compare(r) < 0)),
        InfixOp::Gt => Ok(Object::from_bool(l.compare(r) > 0)),
        InfixOp::Eq => Ok(Object::from_bool(l.compare(r) == 0)),
        InfixOp::NotEq => Ok(Object::from_bool(l.compare(r) != 0)),
        _ => Err(RuntimeError::unknown_infix("STRING", op.as_str(), "STRING")),
    }
}

fn eval_index(collection: &Object, index: &Object) -> InterpResult<Object> {
    match (collection, index) {
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i).cloned())
            .unwrap_or(NULL)),
        (Object::Str(s), Object::Integer(i)) => Ok(s
            .byte_at(*i)
            .map(|c| Object::Str(Rc::new(c)))
            .unwrap_or(NULL)),
        (Object::Hash(hash), _) => Ok(hash.get(index)?.unwrap_or(NULL)),
        _ => Err(RuntimeError::index_not_supported(collection.type_name())),
    }
}
