//! Fuzz target for the doc-comment pipeline
//!
//! Arbitrary UTF-8 goes through lexing, parsing, alias resolution and the
//! strict/lenient entry points. None of them may panic.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use docmeta_core::ReflectionConfig;
use docmeta_dsl::{from_doc_comment, parse, parse_doc_comment};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let output = parse(input, &[]);
        for error in &output.errors {
            assert!(error.line >= 1, "Error line should be >= 1");
            assert!(error.column >= 1, "Error column should be >= 1");
        }

        let lenient = ReflectionConfig::new().with_alias("Canonical", "Alias");
        let parsed = parse_doc_comment(Some(input), &lenient);
        assert!(parsed.annotations.len() <= output.annotations.len());
        assert!(from_doc_comment(Some(input), &lenient).is_ok());

        // Strict mode fails exactly when lenient parsing reported problems.
        let strict = lenient.with_strict(true);
        assert_eq!(
            from_doc_comment(Some(input), &strict).is_err(),
            !parsed.diagnostics.is_empty()
        );
    }
});
