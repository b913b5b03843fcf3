//! Type metadata consumed by the reflection layer

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Supplies class metadata by fully qualified name.
pub trait TypeSource: fmt::Debug + Send + Sync {
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>>;
}

// ============================================================================
// MODIFIERS
// ============================================================================

bitflags! {
    /// Member modifiers, also used as the filter for member listings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const PUBLIC = 0b0000_0001;
        const PROTECTED = 0b0000_0010;
        const PRIVATE = 0b0000_0100;
        const STATIC = 0b0000_1000;
        const ABSTRACT = 0b0001_0000;
        const FINAL = 0b0010_0000;
        /// Matches every member.
        const ALL = Self::PUBLIC.bits()
            | Self::PROTECTED.bits()
            | Self::PRIVATE.bits()
            | Self::STATIC.bits()
            | Self::ABSTRACT.bits()
            | Self::FINAL.bits();
    }
}

impl Modifiers {
    const NAMES: [(&'static str, Modifiers); 6] = [
        ("public", Modifiers::PUBLIC),
        ("protected", Modifiers::PROTECTED),
        ("private", Modifiers::PRIVATE),
        ("static", Modifiers::STATIC),
        ("abstract", Modifiers::ABSTRACT),
        ("final", Modifiers::FINAL),
    ];

    /// True when a member with `self` modifiers passes `filter`.
    pub fn matches(self, filter: Modifiers) -> bool {
        self.intersects(filter)
    }

    pub fn from_name(name: &str) -> Option<Modifiers> {
        Self::NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, m)| *m)
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, m)| self.contains(*m))
            .map(|(n, _)| *n)
            .collect()
    }
}

/// Members declared without modifiers are public.
impl Default for Modifiers {
    fn default() -> Self {
        Self::PUBLIC
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(" "))
    }
}

// Serialized as a list of lowercase names, e.g. ["public", "static"].
impl Serialize for Modifiers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(Modifiers::empty(), |acc, name| {
            Modifiers::from_name(name)
                .map(|m| acc | m)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown modifier: {}", name)))
        })
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Abstract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, rename = "method")]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default, rename = "property")]
    pub properties: Vec<PropertyDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            parent: None,
            interfaces: Vec::new(),
            doc: None,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::default(),
            doc: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(ParameterDescriptor { name: name.into() });
        self
    }

    /// Zero-based position of the named parameter.
    pub fn position_of(&self, parameter: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::default(),
            doc: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDescriptor {
    pub name: String,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_filter() {
        let member = Modifiers::PUBLIC | Modifiers::STATIC;
        assert!(member.matches(Modifiers::ALL));
        assert!(member.matches(Modifiers::STATIC));
        assert!(!member.matches(Modifiers::PRIVATE));
        assert_eq!(Modifiers::ALL, Modifiers::all());
    }

    #[test]
    fn test_modifiers_names() {
        assert_eq!(Modifiers::from_name("Protected"), Some(Modifiers::PROTECTED));
        assert_eq!(Modifiers::from_name("virtual"), None);
        assert_eq!((Modifiers::PRIVATE | Modifiers::FINAL).to_string(), "private final");
    }

    #[test]
    fn test_method_position_of() {
        let method = MethodDescriptor::new("save")
            .with_parameter("entity")
            .with_parameter("force");
        assert_eq!(method.position_of("force"), Some(1));
        assert_eq!(method.position_of("missing"), None);
        assert_eq!(method.modifiers, Modifiers::PUBLIC);
    }
}
