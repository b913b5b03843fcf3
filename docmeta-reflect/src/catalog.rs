//! In-memory type source and TOML manifest loading

use crate::source::{ClassDescriptor, TypeSource};
use docmeta_core::{ConfigError, ReflectionConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A [`TypeSource`] backed by a map of descriptors.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: BTreeMap<String, Arc<ClassDescriptor>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a class, returning the previous descriptor.
    pub fn insert(&mut self, class: ClassDescriptor) -> Option<Arc<ClassDescriptor>> {
        self.classes.insert(class.name.clone(), Arc::new(class))
    }

    pub fn with_class(mut self, class: ClassDescriptor) -> Self {
        self.insert(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn into_source(self) -> Arc<dyn TypeSource> {
        Arc::new(self)
    }
}

impl TypeSource for Catalog {
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(name).cloned()
    }
}

impl FromIterator<ClassDescriptor> for Catalog {
    fn from_iter<I: IntoIterator<Item = ClassDescriptor>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for class in iter {
            catalog.insert(class);
        }
        catalog
    }
}

// ============================================================================
// MANIFEST
// ============================================================================

/// Catalog manifest: a `[reflection]` table with the default parse
/// configuration and one `[[class]]` table per class.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub reflection: ReflectionConfig,
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDescriptor>,
}

impl Manifest {
    /// Parse and validate a manifest.
    ///
    /// Validates:
    /// - TOML syntax and field names
    /// - the `[reflection]` configuration
    /// - class names are non-empty and unique
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| ConfigError::Manifest {
            reason: e.to_string(),
        })?;
        manifest.reflection.validate()?;

        let mut seen = std::collections::HashSet::new();
        for (i, class) in manifest.classes.iter().enumerate() {
            if class.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("class[{}].name", i),
                    value: class.name.clone(),
                    reason: "class name must not be empty".to_string(),
                });
            }
            if !seen.insert(class.name.as_str()) {
                return Err(ConfigError::Manifest {
                    reason: format!("class {} is declared more than once", class.name),
                });
            }
        }

        tracing::debug!(
            classes = manifest.classes.len(),
            aliases = manifest.reflection.aliases.len(),
            "Loaded catalog manifest"
        );
        Ok(manifest)
    }

    /// Split into the catalog and the default parse configuration.
    pub fn into_parts(self) -> (Catalog, ReflectionConfig) {
        (self.classes.into_iter().collect(), self.reflection)
    }
}

// =============================================================================
// TESTS
// =============================================================================
