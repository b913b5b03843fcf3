//! Reflected properties

use crate::annotated::{self, AnnotationCache};
use crate::source::{Modifiers, PropertyDescriptor, TypeSource};
use docmeta_core::{Annotation, AnnotationSet, DocmetaResult, ReflectionConfig, ReflectionError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A property of a class, with memoized annotations.
pub struct ReflectionProperty {
    class_name: String,
    property_name: String,
    source: Arc<dyn TypeSource>,
    config: ReflectionConfig,
    annotations: AnnotationCache,
}

impl ReflectionProperty {
    pub fn new(
        class_name: impl Into<String>,
        property_name: impl Into<String>,
        source: Arc<dyn TypeSource>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            property_name: property_name.into(),
            source,
            config: ReflectionConfig::default(),
            annotations: AnnotationCache::new(),
        }
    }

    pub fn with_config(mut self, config: ReflectionConfig) -> Self {
        self.config = config;
        self.annotations.reset();
        self
    }

    /// Name of the class declaring this property.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn config(&self) -> &ReflectionConfig {
        &self.config
    }

    pub fn annotations_to_ignore(&self) -> &[String] {
        &self.config.ignore
    }

    pub fn annotation_aliases(&self) -> &BTreeMap<String, String> {
        &self.config.aliases
    }

    pub fn add_annotation_alias(&mut self, canonical: impl Into<String>, alias: impl Into<String>) {
        self.config.add_alias(canonical, alias);
        self.annotations.reset();
    }

    pub fn modifiers(&self) -> DocmetaResult<Modifiers> {
        self.with_descriptor(|p| p.modifiers)
    }

    pub fn annotations(&self) -> DocmetaResult<&AnnotationSet> {
        self.annotations
            .load(self, &self.config, || self.with_descriptor(|p| p.doc.clone()))
    }

    pub fn annotation_loads(&self) -> usize {
        self.annotations.loads()
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        annotated::has_annotation(self, self.annotations(), name)
    }

    pub fn annotation(&self, name: &str) -> DocmetaResult<&Annotation> {
        annotated::annotation(self.annotations(), name)
    }

    fn with_descriptor<R>(&self, f: impl FnOnce(&PropertyDescriptor) -> R) -> DocmetaResult<R> {
        let class = self
            .source
            .class(&self.class_name)
            .ok_or_else(|| ReflectionError::ClassNotFound {
                name: self.class_name.clone(),
            })?;
        let property = class
            .property(&self.property_name)
            .ok_or_else(|| ReflectionError::PropertyNotFound {
                class: self.class_name.clone(),
                name: self.property_name.clone(),
            })?;
        Ok(f(property))
    }
}

impl fmt::Display for ReflectionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::${}", self.class_name, self.property_name)
    }
}

impl fmt::Debug for ReflectionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionProperty")
            .field("class_name", &self.class_name)
            .field("property_name", &self.property_name)
            .field("config", &self.config)
            .finish()
    }
}
