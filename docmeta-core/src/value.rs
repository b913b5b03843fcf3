//! Annotation value types

use crate::Annotation;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// KEYS
// ============================================================================

/// Key of an annotation parameter or array entry.
///
/// Positional parameters (`@Foo("a", "b")`) and unkeyed array entries are
/// indexed from zero in source order; named parameters (`@Foo(key=value)`)
/// and keyed array entries carry their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(n) => Some(n.as_str()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(n) => f.write_str(n),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

/// Borrowed lookup against a [`Key`] without allocating one.
pub trait KeyLike {
    fn matches(&self, key: &Key) -> bool;
}

impl KeyLike for Key {
    fn matches(&self, key: &Key) -> bool {
        self == key
    }
}

impl KeyLike for str {
    fn matches(&self, key: &Key) -> bool {
        key.as_name() == Some(self)
    }
}

impl KeyLike for String {
    fn matches(&self, key: &Key) -> bool {
        key.as_name() == Some(self.as_str())
    }
}

impl KeyLike for usize {
    fn matches(&self, key: &Key) -> bool {
        key.as_index() == Some(*self)
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A materialized annotation value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A nested annotation (`@Outer(inner=@Inner)`).
    Annotation(Box<Annotation>),
    /// A brace-delimited list or map (`{ @A, @B }`, `{ "key": "value" }`).
    Array(Values),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            Value::Annotation(a) => Some(a.as_ref()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Values> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Annotation(_) => "annotation",
            Value::Array(_) => "array",
        }
    }

    /// Convert to plain JSON.
    ///
    /// Arrays whose keys are exactly `0..len` become JSON arrays, every other
    /// array becomes an object. Nested annotations become
    /// `{"annotation": name, "values": ...}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Annotation(a) => a.to_json(),
            Value::Array(v) => v.to_json(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Annotation> for Value {
    fn from(a: Annotation) -> Self {
        Value::Annotation(Box::new(a))
    }
}

impl From<Values> for Value {
    fn from(v: Values) -> Self {
        Value::Array(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                let mut values = Values::new();
                for item in items {
                    values.push(Value::from(item));
                }
                Value::Array(values)
            }
            serde_json::Value::Object(map) => {
                let mut values = Values::new();
                for (k, v) in map {
                    values.insert(k, Value::from(v));
                }
                Value::Array(values)
            }
        }
    }
}

// ============================================================================
// VALUE MAP
// ============================================================================

/// Insertion-ordered mapping from [`Key`] to [`Value`].
///
/// Inserting an existing key replaces the value in place and keeps the
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values {
    entries: Vec<(Key, Value)>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<Q: KeyLike + ?Sized>(&self, key: &Q) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| key.matches(k))
            .map(|(_, v)| v)
    }

    pub fn contains_key<Q: KeyLike + ?Sized>(&self, key: &Q) -> bool {
        self.entries.iter().any(|(k, _)| key.matches(k))
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append under the next free positional index and return that key.
    ///
    /// Once `usize::MAX` is taken the entry under it is replaced.
    pub fn push(&mut self, value: impl Into<Value>) -> Key {
        let key = Key::Index(self.next_index());
        self.insert(key.clone(), value);
        key
    }

    /// One past the highest positional key, or zero. Saturates at `usize::MAX`.
    pub fn next_index(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(k, _)| k.as_index())
            .max()
            .map_or(0, |i| i.saturating_add(1))
    }

    pub fn remove<Q: KeyLike + ?Sized>(&mut self, key: &Q) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| key.matches(k))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in insertion order, keys dropped.
    pub fn items(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Nested annotations held directly in this map, in order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.items().filter_map(Value::as_annotation)
    }

    /// True when keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| k.as_index() == Some(i))
    }

    pub fn to_json(&self) -> serde_json::Value {
        if self.is_list() {
            serde_json::Value::Array(self.items().map(Value::to_json).collect())
        } else {
            let map = self
                .entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_json()))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl IntoIterator for Values {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// TESTS
// =============================================================================
