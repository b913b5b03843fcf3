//! Parser module for doc-comment annotations

pub mod ast;
#[allow(clippy::module_inception)]
pub mod parser;

pub use ast::*;

/// Tokenize and parse `source`, dropping top-level annotations named in
/// `ignore`.
pub fn parse(source: &str, ignore: &[String]) -> ParseOutput {
    Parser::from_source(source).with_ignore(ignore).parse()
}

// =============================================================================
// TESTS
// =============================================================================
