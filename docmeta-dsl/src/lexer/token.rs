//! Lexer token types

use serde::Serialize;
use std::fmt;

/// Token kinds for doc-comment annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `@` opening a top-level annotation in free text.
    Tag,
    /// `@` opening a nested annotation inside an argument list.
    At,
    /// Annotation name following `Tag` or `At`.
    Name(String),

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Equals,
    Colon,

    // Literals
    String(String),
    Integer(i64),
    Float(f64),
    True,
    False,
    Null,
    Identifier(String),

    // Special
    Eof,
    Error(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Tag | TokenKind::At => f.write_str("'@'"),
            TokenKind::Name(n) => write!(f, "annotation name '{}'", n),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Equals => f.write_str("'='"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::String(s) => write!(f, "string \"{}\"", s),
            TokenKind::Integer(i) => write!(f, "integer {}", i),
            TokenKind::Float(n) => write!(f, "float {}", n),
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::Null => f.write_str("null"),
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::Eof => f.write_str("end of comment"),
            TokenKind::Error(msg) => write!(f, "error ({})", msg),
        }
    }
}

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
