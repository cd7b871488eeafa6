//! Token definitions

use logos::Logos;
use std::fmt;

/// Monkey token
///
/// Keywords carry no logos pattern of their own: every word is scanned as
/// [`Token::Ident`] and then classified by [`lookup_ident`], which consults
/// both keyword vocabularies before settling on a plain identifier.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*", |lex| lex.slice().to_string())]
    Ident(String),
    /// Digits as written; the parser reports literals that overflow i64
    #[regex("[0-9]+", |lex| lex.slice().to_string())]
    Int(String),
    /// Contents between the quotes, escape sequences left unresolved
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    Str(String),

    // Operators
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("&&")]
    And,
    #[token("||")]
    Or,

    // Delimiters
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Keywords (produced by `lookup_ident`)
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    /// Text the scanner could not classify
    Illegal(String),
    /// End of input
    Eof,
}

impl Token {
    /// Token class name as it appears in parser diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Ident(_) => "IDENT",
            Token::Int(_) => "INT",
            Token::Str(_) => "STRING",
            Token::Assign => "=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Bang => "!",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::And => "&&",
            Token::Or => "||",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Function => "FUNCTION",
            Token::Let => "LET",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::If => "IF",
            Token::Else => "ELSE",
            Token::Return => "RETURN",
            Token::Illegal(_) => "ILLEGAL",
            Token::Eof => "EOF",
        }
    }

    /// Whether `self` and `other` belong to the same token class, ignoring payloads
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

fn keyword(ident: &str) -> Option<Token> {
    let token = match ident {
        "fn" => Token::Function,
        "let" => Token::Let,
        "true" => Token::True,
        "false" => Token::False,
        "if" => Token::If,
        "else" => Token::Else,
        "return" => Token::Return,
        _ => return None,
    };
    Some(token)
}

fn alt_keyword(ident: &str) -> Option<Token> {
    let token = match ident {
        "酷毙了阿狐" => Token::Function,
        "我来" => Token::Let,
        "浙江的猪" => Token::True,
        "好吃得很" => Token::False,
        "你有呲咪呲咪" => Token::If,
        "else" => Token::Else,
        "零利息经济移动" => Token::Return,
        _ => return None,
    };
    Some(token)
}

/// Classify a scanned word as a keyword from either vocabulary, or an identifier
pub fn lookup_ident(ident: String) -> Token {
    keyword(&ident)
        .or_else(|| alt_keyword(&ident))
        .unwrap_or(Token::Ident(ident))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_english_keywords() {
        assert_eq!(lookup_ident("fn".into()), Token::Function);
        assert_eq!(lookup_ident("return".into()), Token::Return);
    }

    #[test]
    fn test_lookup_alternate_keywords() {
        assert_eq!(lookup_ident("酷毙了阿狐".into()), Token::Function);
        assert_eq!(lookup_ident("我来".into()), Token::Let);
        assert_eq!(lookup_ident("浙江的猪".into()), Token::True);
        assert_eq!(lookup_ident("好吃得很".into()), Token::False);
        assert_eq!(lookup_ident("你有呲咪呲咪".into()), Token::If);
        assert_eq!(lookup_ident("零利息经济移动".into()), Token::Return);
    }

    #[test]
    fn test_lookup_falls_back_to_identifier() {
        assert_eq!(lookup_ident("foobar".into()), Token::Ident("foobar".into()));
    }

    #[test]
    fn test_same_kind_ignores_payload() {
        assert!(Token::Ident("a".into()).same_kind(&Token::Ident("b".into())));
        assert!(!Token::Ident("a".into()).same_kind(&Token::Str("a".into())));
    }

    #[test]
    fn test_display_uses_kind_name() {
        assert_eq!(Token::Int("5".into()).to_string(), "INT");
        assert_eq!(Token::Assign.to_string(), "=");
        assert_eq!(Token::Eof.to_string(), "EOF");
    }
}
