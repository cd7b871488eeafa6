//! Expression AST nodes

use super::Block;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// Variable reference
    Ident(String),
    /// Integer literal
    IntLit(i64),
    /// String literal, raw text between the quotes
    StringLit(String),
    /// Boolean literal
    BoolLit(bool),

    /// Prefix operation: `-x`, `!x`
    Prefix { op: PrefixOp, operand: Box<Expr> },

    /// Binary operation
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Conditional: `if (cond) { .. } else { .. }`
    If {
        cond: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },

    /// Function literal. The body is shared with every closure created from it.
    FnLit { params: Vec<String>, body: Rc<Block> },

    /// Function application
    Call { callee: Box<Expr>, args: Vec<Expr> },

    /// Array literal: `[a, b, c]`
    Array(Vec<Expr>),

    /// Hash literal, pairs in source order
    Hash(Vec<(Expr, Expr)>),

    /// Subscript: `collection[index]`
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
    },
}

/// Prefix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

/// Infix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Eq,
    NotEq,
    And,
    Or,
}

impl PrefixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        }
    }
}

impl InfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::IntLit(n) => write!(f, "{n}"),
            Expr::StringLit(raw) => write!(f, "\"{raw}\""),
            Expr::BoolLit(b) => write!(f, "{b}"),
            Expr::Prefix { op, operand } => write!(f, "({op}{operand})"),
            Expr::Infix { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::If {
                cond,
                consequence,
                alternative,
            } => {
                write!(f, "if ({cond}) {{ {consequence} }}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {{ {alt} }}")?;
                }
                Ok(())
            }
            Expr::FnLit { params, body } => {
                write!(f, "fn(")?;
                write_list(f, params)?;
                write!(f, ") {{ {body} }}")
            }
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::Array(elements) => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expr::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expr::Index { collection, index } => write!(f, "({collection}[{index}])"),
        }
    }
}
