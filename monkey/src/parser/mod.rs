//! Operator-precedence (Pratt) parser
//!
//! The parser never stops at the first malformed construct. Every failure
//! is recorded as a [`ParseError`] and parsing resumes at the next token, so
//! one run reports as many independent problems as it can find. Callers
//! must discard the [`Program`] whenever the error list is non-empty.

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Span, Statement};
use crate::lexer::{tokenize, Token};
use std::fmt;
use std::rc::Rc;

#[cfg(test)]
mod tests;

/// Binding power, loosest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn of(token: &Token) -> Precedence {
        match token {
            Token::Or => Precedence::Or,
            Token::And => Precedence::And,
            Token::Eq | Token::NotEq => Precedence::Equals,
            Token::Lt | Token::Gt => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Asterisk | Token::Slash | Token::Percent => Precedence::Product,
            Token::LParen => Precedence::Call,
            Token::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_op(token: &Token) -> Option<InfixOp> {
    let op = match token {
        Token::Plus => InfixOp::Add,
        Token::Minus => InfixOp::Sub,
        Token::Asterisk => InfixOp::Mul,
        Token::Slash => InfixOp::Div,
        Token::Percent => InfixOp::Mod,
        Token::Lt => InfixOp::Lt,
        Token::Gt => InfixOp::Gt,
        Token::Eq => InfixOp::Eq,
        Token::NotEq => InfixOp::NotEq,
        Token::And => InfixOp::And,
        Token::Or => InfixOp::Or,
        _ => return None,
    };
    Some(op)
}

/// A syntax diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a token stream into a program plus every diagnostic encountered
pub fn parse(tokens: Vec<(Token, Span)>) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.errors)
}

/// Tokenize and parse in one step
pub fn parse_source(source: &str) -> (Program, Vec<ParseError>) {
    parse(tokenize(source))
}

/// Pratt parser over a buffered token stream with one token of lookahead
pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<(Token, Span)>) -> Self {
        if !matches!(tokens.last(), Some((Token::Eof, _))) {
            let end = tokens.last().map_or(0, |(_, span)| span.end);
            tokens.push((Token::Eof, Span::point(end)));
        }
        Parser {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    // ---- token cursor ----

    fn cur(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn cur_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    fn peek_index(&self) -> usize {
        (self.pos + 1).min(self.tokens.len() - 1)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.peek_index()].0
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.peek_index()].1
    }

    fn next_token(&mut self) {
        self.pos = self.peek_index();
    }

    fn cur_is(&self, token: &Token) -> bool {
        self.cur().same_kind(token)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().same_kind(token)
    }

    /// Advance if the next token is of the expected class, otherwise record an error
    fn expect_peek(&mut self, expected: &Token) -> bool {
        if self.peek_is(expected) {
            self.next_token();
            true
        } else {
            self.peek_error(expected.kind_name());
            false
        }
    }

    fn expect_peek_ident(&mut self) -> Option<String> {
        if let Token::Ident(name) = self.peek() {
            let name = name.clone();
            self.next_token();
            Some(name)
        } else {
            self.peek_error("IDENT");
            None
        }
    }

    fn peek_error(&mut self, expected: &str) {
        let message = format!(
            "expected next token to be {expected}, got {} instead",
            self.peek()
        );
        self.errors.push(ParseError::new(message, self.peek_span()));
    }

    fn no_prefix_error(&mut self) {
        let message = format!("no prefix parse function for {} found", self.cur());
        self.errors.push(ParseError::new(message, self.cur_span()));
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek())
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::of(self.cur())
    }

    // ---- statements ----

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_is(&Token::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }
        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur() {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let name = self.expect_peek_ident()?;
        if !self.expect_peek(&Token::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_terminator();
        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_terminator();
        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_terminator();
        Some(Statement::Expression(expr))
    }

    fn skip_terminator(&mut self) {
        if self.peek_is(&Token::Semicolon) {
            self.next_token();
        }
    }

    /// Parse `{ stmt* }` with the current token on the opening brace
    fn parse_block(&mut self) -> Block {
        let mut block = Block::default();
        self.next_token();
        while !self.cur_is(&Token::RBrace) && !self.cur_is(&Token::Eof) {
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }
        block
    }

    // ---- expressions ----

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(&Token::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek() {
                Token::LParen => {
                    self.next_token();
                    self.parse_call(left)?
                }
                Token::LBracket => {
                    self.next_token();
                    self.parse_index(left)?
                }
                token => match infix_op(token) {
                    Some(op) => {
                        self.next_token();
                        self.parse_infix(op, left)?
                    }
                    None => return Some(left),
                },
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur() {
            Token::Ident(name) => Some(Expr::Ident(name.clone())),
            Token::Int(digits) => {
                let digits = digits.clone();
                self.parse_integer(digits)
            }
            Token::Str(raw) => Some(Expr::StringLit(raw.clone())),
            Token::True => Some(Expr::BoolLit(true)),
            Token::False => Some(Expr::BoolLit(false)),
            Token::Bang => self.parse_prefix_op(PrefixOp::Not),
            Token::Minus => self.parse_prefix_op(PrefixOp::Neg),
            Token::LParen => self.parse_grouped(),
            Token::If => self.parse_if(),
            Token::Function => self.parse_function_literal(),
            Token::LBracket => {
                let elements = self.parse_expression_list(&Token::RBracket)?;
                Some(Expr::Array(elements))
            }
            Token::LBrace => self.parse_hash_literal(),
            _ => {
                self.no_prefix_error();
                None
            }
        }
    }

    fn parse_integer(&mut self, digits: String) -> Option<Expr> {
        match digits.parse::<i64>() {
            Ok(n) => Some(Expr::IntLit(n)),
            Err(_) => {
                let message = format!("could not parse {digits:?} as integer");
                self.errors.push(ParseError::new(message, self.cur_span()));
                None
            }
        }
    }

    fn parse_prefix_op(&mut self, op: PrefixOp) -> Option<Expr> {
        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_infix(&mut self, op: InfixOp, left: Expr) -> Option<Expr> {
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&Token::RParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_if(&mut self) -> Option<Expr> {
        if !self.expect_peek(&Token::LParen) {
            return None;
        }
        self.next_token();
        let cond = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&Token::RParen) || !self.expect_peek(&Token::LBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let alternative = if self.peek_is(&Token::Else) {
            self.next_token();
            if !self.expect_peek(&Token::LBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };

        Some(Expr::If {
            cond: Box::new(cond),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        if !self.expect_peek(&Token::LParen) {
            return None;
        }
        let params = self.parse_function_params()?;
        if !self.expect_peek(&Token::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expr::FnLit {
            params,
            body: Rc::new(body),
        })
    }

    fn parse_function_params(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if self.peek_is(&Token::RParen) {
            self.next_token();
            return Some(params);
        }

        params.push(self.expect_peek_ident()?);
        while self.peek_is(&Token::Comma) {
            self.next_token();
            params.push(self.expect_peek_ident()?);
        }

        if !self.expect_peek(&Token::RParen) {
            return None;
        }
        Some(params)
    }

    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        let args = self.parse_expression_list(&Token::RParen)?;
        Some(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_index(&mut self, collection: Expr) -> Option<Expr> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&Token::RBracket) {
            return None;
        }
        Some(Expr::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        })
    }

    /// Comma-separated expressions up to `end`, current token on the opener
    fn parse_expression_list(&mut self, end: &Token) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(&Token::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(items)
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(&Token::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(&Token::RBrace) && !self.expect_peek(&Token::Comma) {
                return None;
            }
        }

        if !self.expect_peek(&Token::RBrace) {
            return None;
        }
        Some(Expr::Hash(pairs))
    }
}
