//! Parsed annotation tokens

use crate::lexer::{Lexer, Span, Token, TokenKind};
use docmeta_core::{Key, ParseError};
use serde::Serialize;

/// One annotation as written in source, before alias resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationToken {
    /// Literal name, exactly as spelled after the `@`.
    pub name: String,
    pub values: Vec<(Key, TokenValue)>,
    pub span: Span,
}

impl AnnotationToken {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            span,
        }
    }

    pub fn value(&self, key: &Key) -> Option<&TokenValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// A parameter value inside an [`AnnotationToken`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Annotation(AnnotationToken),
    Array(Vec<(Key, TokenValue)>),
}

/// Everything one parse pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutput {
    /// Well-formed, non-ignored annotations in source order.
    pub annotations: Vec<AnnotationToken>,
    /// One entry per annotation that was skipped as malformed.
    pub errors: Vec<ParseError>,
}

/// Parser for doc-comment annotation tokens.
pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) ignore: &'a [String],
    /// Source the tokens came from, when known; lets recovery re-lex.
    pub(crate) source: Option<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span {
                    start: end,
                    end,
                    ..Span::default()
                },
            });
        }
        Self {
            tokens,
            pos: 0,
            ignore: &[],
            source: None,
        }
    }

    /// Tokenize `source` and parse it with line-based recovery.
    pub fn from_source(source: &'a str) -> Self {
        let mut parser = Self::new(Lexer::new(source).tokenize());
        parser.source = Some(source);
        parser
    }

    /// Drop top-level annotations whose literal name is listed.
    pub fn with_ignore(mut self, ignore: &'a [String]) -> Self {
        self.ignore = ignore;
        self
    }

    /// Parse every top-level annotation.
    ///
    /// A malformed annotation is recorded in [`ParseOutput::errors`] and
    /// skipped. With a known source, lexing restarts in free text at the
    /// next top-level `@` on the failing line or at the start of the next
    /// line, whichever comes first. Otherwise parsing resumes at the next
    /// top-level `@` in the token stream.
    pub fn parse(&mut self) -> ParseOutput {
        let mut output = ParseOutput::default();

        while !self.is_at_end() {
            match self.parse_top_level() {
                Ok(Some(annotation)) => output.annotations.push(annotation),
                Ok(None) => {}
                Err(e) => {
                    output.errors.push(e);
                    self.recover();
                }
            }
        }

        output
    }

    fn recover(&mut self) {
        let Some(source) = self.source else {
            self.synchronize();
            return;
        };

        let failed = self.current().span.start.min(source.len());
        let next_line = source[failed..]
            .find('\n')
            .map_or(source.len(), |i| failed + i + 1);
        let next_tag = self.tokens[self.pos + 1..]
            .iter()
            .find(|t| t.kind == TokenKind::Tag)
            .map(|t| t.span.start);
        let offset = next_tag.map_or(next_line, |tag| tag.min(next_line));

        self.tokens = Lexer::starting_at(source, offset).tokenize();
        self.pos = 0;
    }
}
