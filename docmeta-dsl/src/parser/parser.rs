//! Annotation grammar

use super::ast::*;
use crate::lexer::{Span, TokenKind};
use docmeta_core::{Key, ParseError};

/// Assigns keys to entries written without one.
///
/// Counts from 0 in source order; an explicit integer key moves the counter
/// past itself.
#[derive(Debug, Default)]
struct IndexCounter {
    next: usize,
}

impl IndexCounter {
    fn next_key(&mut self) -> Key {
        let key = Key::Index(self.next);
        self.next = self.next.saturating_add(1);
        key
    }

    fn observe(&mut self, key: &Key) {
        if let Key::Index(i) = key {
            self.next = self.next.max(i.saturating_add(1));
        }
    }
}

impl<'a> Parser<'a> {
    /// Parse one top-level annotation. Returns `Ok(None)` for an ignored one.
    pub(crate) fn parse_top_level(&mut self) -> Result<Option<AnnotationToken>, ParseError> {
        let span = self.current().span;
        if !self.check(&TokenKind::Tag) {
            return Err(self.unexpected("'@'"));
        }
        self.advance();

        let name = self.expect_name()?;
        if self.ignore.iter().any(|n| *n == name) {
            self.synchronize();
            return Ok(None);
        }

        self.parse_annotation_body(name, span).map(Some)
    }

    /// Parse the optional argument list following an annotation name.
    fn parse_annotation_body(
        &mut self,
        name: String,
        span: Span,
    ) -> Result<AnnotationToken, ParseError> {
        let mut annotation = AnnotationToken::new(name, span);

        if self.check(&TokenKind::LParen) {
            self.advance();
            annotation.values = self.parse_parameters()?;
        }

        Ok(annotation)
    }

    /// `param (',' param)* [','] ')'`, with the `(` already consumed.
    fn parse_parameters(&mut self) -> Result<Vec<(Key, TokenValue)>, ParseError> {
        let mut entries = Vec::new();
        let mut counter = IndexCounter::default();

        loop {
            if self.check(&TokenKind::RParen) {
                self.advance();
                break;
            }

            let key = match (&self.current().kind, self.peek_kind(1)) {
                (TokenKind::Identifier(name), TokenKind::Equals) => {
                    let key = Key::Name(name.clone());
                    self.advance();
                    self.advance();
                    key
                }
                _ => counter.next_key(),
            };
            let value = self.parse_value()?;
            entries.push((key, value));

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RParen) {
                return Err(self.unexpected("',' or ')'"));
            }
        }

        Ok(entries)
    }

    /// `entry (',' entry)* [','] '}'`, with the `{` already consumed.
    fn parse_array(&mut self) -> Result<Vec<(Key, TokenValue)>, ParseError> {
        let mut entries = Vec::new();
        let mut counter = IndexCounter::default();

        loop {
            if self.check(&TokenKind::RBrace) {
                self.advance();
                break;
            }

            let explicit = match self.peek_kind(1) {
                TokenKind::Equals | TokenKind::Colon => match &self.current().kind {
                    TokenKind::String(s) | TokenKind::Identifier(s) => Some(Key::Name(s.clone())),
                    TokenKind::Integer(i) => Some(match usize::try_from(*i) {
                        Ok(index) => Key::Index(index),
                        Err(_) => Key::Name(i.to_string()),
                    }),
                    _ => None,
                },
                _ => None,
            };
            let key = match explicit {
                Some(key) => {
                    self.advance();
                    self.advance();
                    counter.observe(&key);
                    key
                }
                None => counter.next_key(),
            };
            let value = self.parse_value()?;
            entries.push((key, value));

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected("',' or '}'"));
            }
        }

        Ok(entries)
    }

    fn parse_value(&mut self) -> Result<TokenValue, ParseError> {
        let value = match &self.current().kind {
            TokenKind::String(s) | TokenKind::Identifier(s) => TokenValue::String(s.clone()),
            TokenKind::Integer(i) => TokenValue::Integer(*i),
            TokenKind::Float(f) => TokenValue::Float(*f),
            TokenKind::True => TokenValue::Bool(true),
            TokenKind::False => TokenValue::Bool(false),
            TokenKind::Null => TokenValue::Null,
            TokenKind::At => {
                let span = self.current().span;
                self.advance();
                let name = self.expect_name()?;
                return self
                    .parse_annotation_body(name, span)
                    .map(TokenValue::Annotation);
            }
            TokenKind::LBrace => {
                self.advance();
                return self.parse_array().map(TokenValue::Array);
            }
            _ => return Err(self.unexpected("value")),
        };

        self.advance();
        Ok(value)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(crate) fn current(&self) -> &crate::lexer::Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn expect_name(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Name(n) => {
                let n = n.clone();
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected("annotation name")),
        }
    }

    /// Skip to the next top-level `@` or the end of input.
    pub(crate) fn synchronize(&mut self) {
        while !self.is_at_end() && !self.check(&TokenKind::Tag) {
            self.advance();
        }
    }

    /// Error for the current token; lexer errors keep their own message.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        match &self.current().kind {
            TokenKind::Error(msg) => self.error(msg),
            found => self.error(&format!("Expected {}, found {}", expected, found)),
        }
    }

    pub(crate) fn error(&self, msg: &str) -> ParseError {
        let span = self.current().span;
        ParseError {
            message: msg.to_string(),
            line: span.line,
            column: span.column,
        }
    }
}
