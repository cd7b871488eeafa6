//! Lexer implementation using logos

mod token;

pub use token::{lookup_ident, Token};

use crate::ast::Span;
use logos::Logos;

/// Tokenize source code
///
/// The result always ends with [`Token::Eof`]. Characters the scanner does not
/// recognise become [`Token::Illegal`] so the parser can report them alongside
/// its own diagnostics.
pub fn tokenize(source: &str) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let token = match result {
            Ok(Token::Ident(word)) => lookup_ident(word),
            Ok(token) => token,
            Err(_) => Token::Illegal(lexer.slice().to_string()),
        };
        tokens.push((token, span));
    }

    tokens.push((Token::Eof, Span::point(source.len())));
    tokens
}
