//! Materialized annotation records

use crate::{ConstructionError, Instance, KeyLike, Registry, Value, Values};
use serde::{Deserialize, Serialize};

// ============================================================================
// ANNOTATION
// ============================================================================

/// One annotation occurrence found in a doc comment.
///
/// `name` is always the canonical name: when the source used an alias, the
/// alias has already been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    name: String,
    values: Values,
}

impl Annotation {
    /// Create an annotation holding a copy of every entry in `values`.
    pub fn new(name: impl Into<String>, values: &Values) -> Self {
        Self::with_defaults(name, Values::new(), values)
    }

    /// Create an annotation without values, as a bare `@Name` produces.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Values::new(),
        }
    }

    /// Start from `defaults` and copy `values` over them entry by entry.
    ///
    /// Defaults whose keys do not appear in `values` survive; the passed map
    /// is never adopted wholesale.
    pub fn with_defaults(name: impl Into<String>, defaults: Values, values: &Values) -> Self {
        let mut own = defaults;
        for (key, value) in values.iter() {
            own.insert(key.clone(), value.clone());
        }
        Self {
            name: name.into(),
            values: own,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// True when the key exists and does not hold `null`.
    pub fn has_value<Q: KeyLike + ?Sized>(&self, key: &Q) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_null())
    }

    /// The value for `key`, or `None` when missing or `null`.
    pub fn value<Q: KeyLike + ?Sized>(&self, key: &Q) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Set a value, overwriting any existing one.
    pub fn set_value(&mut self, key: impl Into<crate::Key>, value: impl Into<Value>) {
        self.values.insert(key, value);
    }

    /// Construct a live instance of the type registered under this
    /// annotation's name.
    pub fn new_instance<I>(&self, registry: &Registry, args: I) -> Result<Instance, ConstructionError>
    where
        I: IntoIterator<Item = Value>,
    {
        let args: Vec<Value> = args.into_iter().collect();
        self.new_instance_args(registry, &args)
    }

    /// Construct a live instance, passing `args` to the registered factory.
    pub fn new_instance_args(
        &self,
        registry: &Registry,
        args: &[Value],
    ) -> Result<Instance, ConstructionError> {
        registry.new_instance_args(&self.name, args)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "annotation": self.name,
            "values": self.values.to_json(),
        })
    }
}

// ============================================================================
// ANNOTATION SET
// ============================================================================

/// Canonical name → annotation, in first-seen order.
///
/// A name inserted twice keeps its first position and the later record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Annotation>", into = "Vec<Annotation>")]
pub struct AnnotationSet {
    entries: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert under the annotation's own name, returning the replaced record.
    pub fn insert(&mut self, annotation: Annotation) -> Option<Annotation> {
        match self.entries.iter_mut().find(|a| a.name == annotation.name) {
            Some(slot) => Some(std::mem::replace(slot, annotation)),
            None => {
                self.entries.push(annotation);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|a| (a.name.clone(), a.values.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl FromIterator<Annotation> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut set = AnnotationSet::new();
        for annotation in iter {
            set.insert(annotation);
        }
        set
    }
}

impl From<Vec<Annotation>> for AnnotationSet {
    fn from(entries: Vec<Annotation>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<AnnotationSet> for Vec<Annotation> {
    fn from(set: AnnotationSet) -> Self {
        set.entries
    }
}

impl IntoIterator for AnnotationSet {
    type Item = Annotation;
    type IntoIter = std::vec::IntoIter<Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// TESTS
// =============================================================================
