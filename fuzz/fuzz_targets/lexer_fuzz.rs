//! Fuzz target for the annotation lexer
//!
//! Feeds arbitrary UTF-8 through the lexer looking for panics and
//! non-terminating scans.
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use docmeta_dsl::{Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens = Lexer::new(input).tokenize();

        // Exactly one Eof, always last.
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eofs, 1, "Tokenization should produce a single Eof");
        assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));

        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.line >= 1, "Line numbers should be >= 1");
            assert!(token.span.column >= 1, "Column numbers should be >= 1");
        }
    }
});
