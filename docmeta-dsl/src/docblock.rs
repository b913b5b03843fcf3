//! Doc comment → annotation set pipeline

use crate::parser;
use crate::resolve::{materialize_all, AliasResolver};
use docmeta_core::{AnnotationSet, DocmetaResult, ParseError, ReflectionConfig};

/// Result of a best-effort parse: the annotations that parsed, plus a
/// diagnostic for each one that was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocComment {
    pub annotations: AnnotationSet,
    pub diagnostics: Vec<ParseError>,
}

/// Parse a doc comment without failing.
///
/// `None` and empty comments yield an empty set. Malformed annotations are
/// skipped and reported in `diagnostics`. `config.strict` is not consulted.
pub fn parse_doc_comment(doc: Option<&str>, config: &ReflectionConfig) -> ParsedDocComment {
    let Some(source) = doc.filter(|d| !d.trim().is_empty()) else {
        return ParsedDocComment::default();
    };

    let output = parser::parse(source, &config.ignore);
    let resolver = AliasResolver::new(&config.aliases);

    ParsedDocComment {
        annotations: materialize_all(&output.annotations, &resolver),
        diagnostics: output.errors,
    }
}

/// Parse a doc comment into its annotation set.
///
/// Malformed annotations are logged and skipped unless `config.strict` is
/// set, in which case the first one is returned as the error.
pub fn from_doc_comment(doc: Option<&str>, config: &ReflectionConfig) -> DocmetaResult<AnnotationSet> {
    let parsed = parse_doc_comment(doc, config);

    if let Some(first) = parsed.diagnostics.first() {
        if config.strict {
            return Err(first.clone().into());
        }
        for diagnostic in &parsed.diagnostics {
            tracing::warn!(
                line = diagnostic.line,
                column = diagnostic.column,
                error = %diagnostic.message,
                "Skipping malformed annotation"
            );
        }
    }

    Ok(parsed.annotations)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use docmeta_core::{DocmetaError, Value};

    const CLASS_DOC: &str = r#"/**
 * This is a test class.
 *
 * @author    Tim Wagner <tw@appserver.io>
 * @copyright 2015 TechDivision GmbH <info@appserver.io>
 * @license   http://opensource.org/licenses/osl-3.0.php Open Software License (OSL 3.0)
 * @link      https://github.com/appserver-io/lang
 * @MockAnnotation(name=MockAnnotation, description="some description", value="a value")
 */"#;

    #[test]
    fn test_none_and_empty_yield_empty_set() {
        let config = ReflectionConfig::default();
        assert!(from_doc_comment(None, &config).expect("none").is_empty());
        assert!(from_doc_comment(Some(""), &config).expect("empty").is_empty());
        assert!(from_doc_comment(Some("/** */"), &config).expect("blank").is_empty());
    }

    #[test]
    fn test_class_doc_comment() {
        let set = from_doc_comment(Some(CLASS_DOC), &ReflectionConfig::default()).expect("parse");
        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec!["author", "copyright", "license", "link", "MockAnnotation"]
        );

        let mock = set.get("MockAnnotation").expect("mock");
        assert_eq!(mock.value("name").and_then(Value::as_str), Some("MockAnnotation"));
        assert_eq!(mock.value("description").and_then(Value::as_str), Some("some description"));
        assert_eq!(mock.value("value").and_then(Value::as_str), Some("a value"));
        assert!(mock.value("nonexistentKey").is_none());
    }

    #[test]
    fn test_ignore_list_drops_literal_names() {
        let config = ReflectionConfig::new().with_ignore(["author", "license"]);
        let set = from_doc_comment(Some(CLASS_DOC), &config).expect("parse");
        assert!(!set.contains("author"));
        assert!(!set.contains("license"));
        assert!(set.contains("copyright"));
    }

    #[test]
    fn test_alias_resolves_to_canonical_name() {
        let config = ReflectionConfig::new().with_alias("MockAnnotation", "M");
        let set = from_doc_comment(Some("/** @M(name=Test) */"), &config).expect("parse");
        assert!(!set.contains("M"));
        let mock = set.get("MockAnnotation").expect("canonical");
        assert_eq!(mock.name(), "MockAnnotation");
        assert_eq!(mock.value("name").and_then(Value::as_str), Some("Test"));
    }

    #[test]
    fn test_ignore_applies_before_alias_resolution() {
        let config = ReflectionConfig::new()
            .with_alias("MockAnnotation", "M")
            .with_ignore(["MockAnnotation"]);
        let set = from_doc_comment(Some("/** @M(name=Test) */"), &config).expect("parse");
        assert!(set.contains("MockAnnotation"));
    }

    #[test]
    fn test_malformed_annotation_is_skipped() {
        let doc = "/**\n * @Broken(name=)\n * @Good(flag=true)\n */";
        let parsed = parse_doc_comment(Some(doc), &ReflectionConfig::default());
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(parsed.annotations.contains("Good"));
        assert!(!parsed.annotations.contains("Broken"));

        let set = from_doc_comment(Some(doc), &ReflectionConfig::default()).expect("lenient");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_strict_mode_returns_first_error() {
        let doc = "/** @Broken(name=, other) */";
        let config = ReflectionConfig::new().with_strict(true);
        let err = from_doc_comment(Some(doc), &config).unwrap_err();
        assert!(matches!(err, DocmetaError::Parse(ref e) if e.line == 1));
    }
}
