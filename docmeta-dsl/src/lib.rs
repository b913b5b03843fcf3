//! Docmeta DSL - Doc-Comment Annotation Parser
//!
//! Turns the annotation syntax embedded in doc comments into
//! [`AnnotationSet`](docmeta_core::AnnotationSet)s.
//!
//! Pipeline:
//! ```text
//! Doc comment text
//!     ↓
//! Lexer (free text skipped, tokens for @Name(...) only)
//!     ↓
//! Parser (AnnotationToken tree, ignore list applied)
//!     ↓
//! AliasResolver + materialize (canonical names, owned records)
//!     ↓
//! AnnotationSet
//! ```

pub mod docblock;
pub mod lexer;
pub mod parser;
pub mod resolve;

pub use docblock::{from_doc_comment, parse_doc_comment, ParsedDocComment};
pub use lexer::{tokenize, Lexer, Span, Token, TokenKind};
pub use parser::{parse, AnnotationToken, ParseOutput, Parser, TokenValue};
pub use resolve::{materialize, materialize_all, AliasResolver};
