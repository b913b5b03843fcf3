//! Alias resolution and record materialization

use crate::parser::{AnnotationToken, TokenValue};
use docmeta_core::{Annotation, AnnotationSet, Key, Value, Values};
use std::collections::{BTreeMap, HashMap};

/// Maps literal annotation names to canonical names.
///
/// Built from a canonical → alias map. When two canonical names share an
/// alias the one iterated last wins.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver<'a> {
    inverse: HashMap<&'a str, &'a str>,
}

impl<'a> AliasResolver<'a> {
    pub fn new(aliases: &'a BTreeMap<String, String>) -> Self {
        let inverse = aliases
            .iter()
            .map(|(canonical, alias)| (alias.as_str(), canonical.as_str()))
            .collect();
        Self { inverse }
    }

    /// Canonical name for `name`, or `name` itself when it is not an alias.
    pub fn resolve<'s>(&'s self, name: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.inverse.get(name).copied().unwrap_or(name)
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }
}

/// Convert one token into a record, resolving nested names with the same
/// resolver at every depth.
pub fn materialize(token: &AnnotationToken, resolver: &AliasResolver<'_>) -> Annotation {
    let values = materialize_entries(&token.values, resolver);
    Annotation::new(resolver.resolve(&token.name), &values)
}

/// Materialize every token into a set keyed by canonical name.
pub fn materialize_all(tokens: &[AnnotationToken], resolver: &AliasResolver<'_>) -> AnnotationSet {
    let mut set = AnnotationSet::new();
    for token in tokens {
        let annotation = materialize(token, resolver);
        tracing::trace!(
            literal = %token.name,
            name = %annotation.name(),
            values = annotation.values().len(),
            "resolved annotation"
        );
        set.insert(annotation);
    }
    set
}

fn materialize_entries(entries: &[(Key, TokenValue)], resolver: &AliasResolver<'_>) -> Values {
    let mut values = Values::new();
    for (key, value) in entries {
        values.insert(key.clone(), materialize_value(value, resolver));
    }
    values
}

fn materialize_value(value: &TokenValue, resolver: &AliasResolver<'_>) -> Value {
    match value {
        TokenValue::Null => Value::Null,
        TokenValue::Bool(b) => Value::Bool(*b),
        TokenValue::Integer(i) => Value::Integer(*i),
        TokenValue::Float(f) => Value::Float(*f),
        TokenValue::String(s) => Value::String(s.clone()),
        TokenValue::Annotation(token) => Value::from(materialize(token, resolver)),
        TokenValue::Array(entries) => Value::Array(materialize_entries(entries, resolver)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
