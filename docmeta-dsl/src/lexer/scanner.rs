//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

/// Where the lexer currently is relative to annotation syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Free comment text; only an eligible `@` is significant.
    Text,
    /// Right after an `@`; the next token is the annotation name.
    Name,
    /// Inside a parenthesised argument list.
    Arguments,
}

/// Lexer for doc-comment annotations.
///
/// Free text between annotations produces no tokens. A top-level annotation
/// starts at an `@` that begins the input or follows whitespace or `*`, and
/// is followed by a name; `tw@example.com` never opens one.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
    prev: Option<char>,
    mode: Mode,
    depth: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
            prev: None,
            mode: Mode::Text,
            depth: 0,
        }
    }

    /// Create a lexer that starts in free text at byte `offset` of `source`.
    ///
    /// `offset` must fall on a char boundary. Spans stay relative to the
    /// whole source.
    pub fn starting_at(source: &'a str, offset: usize) -> Self {
        let mut lexer = Self::new(source);
        while lexer.pos < offset && lexer.advance().is_some() {}
        lexer.prev = None;
        lexer
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the source.
    fn next_token(&mut self) -> Token {
        match self.mode {
            Mode::Text => self.skip_text(),
            Mode::Arguments => self.skip_whitespace(),
            Mode::Name => {}
        }

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let kind = match self.mode {
            Mode::Text => match self.peek_char() {
                None => TokenKind::Eof,
                Some(_) => {
                    self.advance(); // @
                    self.mode = Mode::Name;
                    TokenKind::Tag
                }
            },
            Mode::Name => self.scan_name(),
            Mode::Arguments => self.scan_argument_token(start_pos),
        };

        Token {
            kind,
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Scan an annotation name and pick the mode that follows it.
    fn scan_name(&mut self) -> TokenKind {
        let rest = &self.source[self.pos..];
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            if is_name_char(c) {
                end = i + c.len_utf8();
            } else {
                break;
            }
        }
        // A sentence-ending dot is not part of the name.
        let name = rest[..end].trim_end_matches('.').to_string();
        for _ in name.chars() {
            self.advance();
        }

        self.mode = if self.depth > 0 || self.peek_char() == Some('(') {
            Mode::Arguments
        } else {
            Mode::Text
        };

        if name.is_empty() {
            TokenKind::Error("Expected annotation name".to_string())
        } else {
            TokenKind::Name(name)
        }
    }

    fn scan_argument_token(&mut self, start_pos: usize) -> TokenKind {
        let Some(c) = self.peek_char() else {
            return TokenKind::Eof;
        };

        match c {
            '(' => {
                self.advance();
                self.depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    self.mode = Mode::Text;
                }
                TokenKind::RParen
            }
            '{' => {
                self.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.advance();
                TokenKind::RBrace
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '=' => {
                self.advance();
                TokenKind::Equals
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            '@' => {
                self.advance();
                if self.peek_char().is_some_and(is_name_start) {
                    self.mode = Mode::Name;
                    TokenKind::At
                } else {
                    TokenKind::Error("Expected annotation name after '@'".to_string())
                }
            }
            '*' if self.peek_next_char() == Some('/') => {
                // The comment closed inside an argument list.
                self.advance();
                self.advance();
                self.depth = 0;
                self.mode = Mode::Text;
                TokenKind::Error("Unterminated annotation arguments".to_string())
            }
            '"' | '\'' => self.scan_string(c),
            '-' | '+' if self.peek_next_char().is_some_and(|n| n.is_ascii_digit()) => {
                self.advance();
                self.scan_number(start_pos)
            }
            c if c.is_ascii_digit() => self.scan_number(start_pos),
            c if is_name_start(c) => self.scan_identifier(),
            c => {
                self.advance();
                TokenKind::Error(format!("Unexpected character: {}", c))
            }
        }
    }

    /// Scan a bare identifier or keyword literal.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if is_name_char(c) {
                self.advance();
            } else if c == ':' && self.peek_next_char() == Some(':') {
                // Class constant reference, e.g. Status::ACTIVE
                self.advance();
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[start..self.pos];

        match ident.to_lowercase().as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => TokenKind::Identifier(ident.to_string()),
        }
    }

    /// Scan a quoted string literal with escape sequences.
    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek_char() {
                None | Some('\n') => return self.unterminated_string(),
                Some('*') if self.peek_next_char() == Some('/') => {
                    return self.unterminated_string();
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => {
                            self.advance();
                            value.push('\n');
                        }
                        Some('t') => {
                            self.advance();
                            value.push('\t');
                        }
                        Some('r') => {
                            self.advance();
                            value.push('\r');
                        }
                        Some(c) if c == '\\' || c == '"' || c == '\'' => {
                            self.advance();
                            value.push(c);
                        }
                        _ => value.push('\\'),
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        TokenKind::String(value)
    }

    /// A string may not run past its line or the comment close. Drop back to
    /// free text so the next line is scanned for annotations again.
    fn unterminated_string(&mut self) -> TokenKind {
        self.depth = 0;
        self.mode = Mode::Text;
        TokenKind::Error("Unterminated string".to_string())
    }

    /// Scan an integer or float literal. A leading sign, if any, has already
    /// been consumed from `start`.
    fn scan_number(&mut self, start: usize) -> TokenKind {
        let mut is_float = false;

        self.consume_digits();

        if self.peek_char() == Some('.') && self.peek_next_char().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.consume_digits();
        }

        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let rest = &self.source[self.pos..];
            let mut tail = rest.chars().skip(1);
            let exponent_follows = match tail.next() {
                Some('+') | Some('-') => tail.next().is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                is_float = true;
                self.advance(); // e
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        let text = &self.source[start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Float(n),
                Err(_) => TokenKind::Error(format!("Invalid number: {}", text)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Integer(n),
                Err(_) => TokenKind::Error(format!("Invalid number: {}", text)),
            }
        }
    }

    fn consume_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Skip free text up to the next eligible `@`.
    fn skip_text(&mut self) {
        while let Some(c) = self.peek_char() {
            let boundary = match self.prev {
                None => true,
                Some(p) => p.is_whitespace() || p == '*',
            };
            if c == '@' && boundary && self.peek_next_char().is_some_and(is_name_start) {
                return;
            }
            self.advance();
        }
    }

    /// Skip whitespace inside an argument list, including the `*` leader of
    /// continuation lines.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    while matches!(self.peek_char(), Some(' ') | Some('\t')) {
                        self.advance();
                    }
                    if self.peek_char() == Some('*') && self.peek_next_char() != Some('/') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].char_indices();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            self.prev = Some(c);
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\\'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\\' | '.' | '-')
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

// =============================================================================
// TESTS
// =============================================================================
