//! Reflected methods

use crate::annotated::{self, AnnotationCache};
use crate::memo::Memo;
use crate::parameter::ReflectionParameter;
use crate::source::{MethodDescriptor, Modifiers, TypeSource};
use docmeta_core::{
    Annotation, AnnotationSet, ConstructionError, DocmetaResult, ReflectionConfig,
    ReflectionError, Registry, Value,
};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A method of a class, with memoized annotations and parameters.
pub struct ReflectionMethod {
    class_name: String,
    method_name: String,
    source: Arc<dyn TypeSource>,
    config: ReflectionConfig,
    annotations: AnnotationCache,
    parameters: Memo<Vec<ReflectionParameter>>,
}

impl ReflectionMethod {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        source: Arc<dyn TypeSource>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            source,
            config: ReflectionConfig::default(),
            annotations: AnnotationCache::new(),
            parameters: Memo::new(),
        }
    }

    pub fn with_config(mut self, config: ReflectionConfig) -> Self {
        self.config = config;
        self.annotations.reset();
        self
    }

    /// Name of the class declaring this method.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
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

    /// Register an alias; a cached annotation set is dropped so the next
    /// access re-parses with it.
    pub fn add_annotation_alias(&mut self, canonical: impl Into<String>, alias: impl Into<String>) {
        self.config.add_alias(canonical, alias);
        self.annotations.reset();
    }

    pub fn modifiers(&self) -> DocmetaResult<Modifiers> {
        self.with_descriptor(|m| m.modifiers)
    }

    pub fn annotations(&self) -> DocmetaResult<&AnnotationSet> {
        self.annotations.load(self, &self.config, || {
            self.with_descriptor(|m| m.doc.clone())
        })
    }

    /// Number of times the annotation pipeline has run for this method.
    pub fn annotation_loads(&self) -> usize {
        self.annotations.loads()
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        annotated::has_annotation(self, self.annotations(), name)
    }

    pub fn annotation(&self, name: &str) -> DocmetaResult<&Annotation> {
        annotated::annotation(self.annotations(), name)
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> DocmetaResult<&[ReflectionParameter]> {
        self.parameters
            .get_or_try_init(|| {
                self.with_descriptor(|m| {
                    m.parameters
                        .iter()
                        .map(|p| {
                            ReflectionParameter::new(
                                self.class_name.clone(),
                                self.method_name.clone(),
                                p.name.clone(),
                                Arc::clone(&self.source),
                            )
                        })
                        .collect()
                })
            })
            .map(Vec::as_slice)
    }

    pub fn parameter(&self, name: &str) -> DocmetaResult<&ReflectionParameter> {
        self.parameters()?
            .iter()
            .find(|p| p.parameter_name() == name)
            .ok_or_else(|| {
                ReflectionError::ParameterNotFound {
                    class: self.class_name.clone(),
                    method: self.method_name.clone(),
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Invoke the handler registered for this method on `target`.
    pub fn invoke<I>(&self, registry: &Registry, target: &dyn Any, args: I) -> Result<Value, ConstructionError>
    where
        I: IntoIterator<Item = Value>,
    {
        let args: Vec<Value> = args.into_iter().collect();
        self.invoke_args(registry, target, &args)
    }

    pub fn invoke_args(
        &self,
        registry: &Registry,
        target: &dyn Any,
        args: &[Value],
    ) -> Result<Value, ConstructionError> {
        registry.invoke_args(&self.class_name, &self.method_name, target, args)
    }

    fn with_descriptor<R>(&self, f: impl FnOnce(&MethodDescriptor) -> R) -> DocmetaResult<R> {
        let class = self
            .source
            .class(&self.class_name)
            .ok_or_else(|| ReflectionError::ClassNotFound {
                name: self.class_name.clone(),
            })?;
        let method = class
            .method(&self.method_name)
            .ok_or_else(|| ReflectionError::MethodNotFound {
                class: self.class_name.clone(),
                name: self.method_name.clone(),
            })?;
        Ok(f(method))
    }
}

impl fmt::Display for ReflectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class_name, self.method_name)
    }
}

impl fmt::Debug for ReflectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionMethod")
            .field("class_name", &self.class_name)
            .field("method_name", &self.method_name)
            .field("config", &self.config)
            .finish()
    }
}
