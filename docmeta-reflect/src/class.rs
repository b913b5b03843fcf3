//! Reflected classes

use crate::annotated::{self, AnnotationCache};
use crate::catalog::Catalog;
use crate::method::ReflectionMethod;
use crate::property::ReflectionProperty;
use crate::source::{ClassDescriptor, ClassKind, Modifiers, TypeSource};
use docmeta_core::{
    Annotation, AnnotationSet, ConstructionError, DocmetaResult, Instance, ReflectionConfig,
    ReflectionError, Registry, Value,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Members of a class in declaration order, subclass first.
pub type Members<T> = Arc<Vec<Arc<T>>>;

type MemberCache<T> = Mutex<HashMap<Modifiers, Members<T>>>;

/// A class looked up by name in a [`TypeSource`].
///
/// Annotations, methods and properties are computed on first access and
/// cached for the lifetime of the value. Methods and properties inherit this
/// class's ignore list and alias map.
pub struct ReflectionClass {
    name: String,
    source: Arc<dyn TypeSource>,
    config: ReflectionConfig,
    annotations: AnnotationCache,
    methods: MemberCache<ReflectionMethod>,
    properties: MemberCache<ReflectionProperty>,
}

impl ReflectionClass {
    pub fn new(name: impl Into<String>, source: Arc<dyn TypeSource>) -> Self {
        Self {
            name: name.into(),
            source,
            config: ReflectionConfig::default(),
            annotations: AnnotationCache::new(),
            methods: Mutex::new(HashMap::new()),
            properties: Mutex::new(HashMap::new()),
        }
    }

    /// Reflect a single descriptor without a shared source. Parent classes
    /// and interfaces it names are not resolvable.
    pub fn from_descriptor(descriptor: ClassDescriptor) -> Self {
        let name = descriptor.name.clone();
        Self::new(name, Catalog::new().with_class(descriptor).into_source())
    }

    pub fn with_config(mut self, config: ReflectionConfig) -> Self {
        self.config = config;
        self.invalidate();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace.
    pub fn short_name(&self) -> &str {
        let start = ["\\", "::", "."]
            .iter()
            .filter_map(|sep| self.name.rfind(sep).map(|i| i + sep.len()))
            .max()
            .unwrap_or(0);
        &self.name[start..]
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

    /// Register an alias. Cached annotations and members are dropped so the
    /// next access picks it up.
    pub fn add_annotation_alias(&mut self, canonical: impl Into<String>, alias: impl Into<String>) {
        self.config.add_alias(canonical, alias);
        self.invalidate();
    }

    pub fn descriptor(&self) -> DocmetaResult<Arc<ClassDescriptor>> {
        Ok(lookup(self.source.as_ref(), &self.name)?)
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    pub fn annotations(&self) -> DocmetaResult<&AnnotationSet> {
        self.annotations.load(self, &self.config, || {
            Ok(self.descriptor()?.doc.clone())
        })
    }

    /// Number of times the annotation pipeline has run for this class.
    pub fn annotation_loads(&self) -> usize {
        self.annotations.loads()
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        annotated::has_annotation(self, self.annotations(), name)
    }

    pub fn annotation(&self, name: &str) -> DocmetaResult<&Annotation> {
        annotated::annotation(self.annotations(), name)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Methods whose modifiers share a flag with `filter`, including
    /// inherited ones.
    pub fn methods(&self, filter: Modifiers) -> DocmetaResult<Members<ReflectionMethod>> {
        let mut cache = self.methods.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(&filter) {
            return Ok(Arc::clone(hit));
        }

        let mut members = Vec::new();
        let mut seen = HashSet::new();
        for class in self.lineage()? {
            for method in &class.methods {
                if !seen.insert(method.name.clone()) || !method.modifiers.matches(filter) {
                    continue;
                }
                let reflection =
                    ReflectionMethod::new(&class.name, &method.name, Arc::clone(&self.source))
                        .with_config(self.config.clone());
                members.push(Arc::new(reflection));
            }
        }

        tracing::debug!(class = %self.name, filter = %filter, methods = members.len(), "Loaded methods");
        let members = Arc::new(members);
        cache.insert(filter, Arc::clone(&members));
        Ok(members)
    }

    pub fn has_method(&self, name: &str) -> bool {
        match self.methods(Modifiers::ALL) {
            Ok(members) => members.iter().any(|m| m.method_name() == name),
            Err(e) => {
                tracing::warn!(class = %self.name, method = name, error = %e, "Failed to load methods");
                false
            }
        }
    }

    pub fn method(&self, name: &str) -> DocmetaResult<Arc<ReflectionMethod>> {
        self.methods(Modifiers::ALL)?
            .iter()
            .find(|m| m.method_name() == name)
            .cloned()
            .ok_or_else(|| {
                ReflectionError::MethodNotFound {
                    class: self.name.clone(),
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Properties whose modifiers share a flag with `filter`, including
    /// inherited ones.
    pub fn properties(&self, filter: Modifiers) -> DocmetaResult<Members<ReflectionProperty>> {
        let mut cache = self.properties.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(&filter) {
            return Ok(Arc::clone(hit));
        }

        let mut members = Vec::new();
        let mut seen = HashSet::new();
        for class in self.lineage()? {
            for property in &class.properties {
                if !seen.insert(property.name.clone()) || !property.modifiers.matches(filter) {
                    continue;
                }
                let reflection =
                    ReflectionProperty::new(&class.name, &property.name, Arc::clone(&self.source))
                        .with_config(self.config.clone());
                members.push(Arc::new(reflection));
            }
        }

        tracing::debug!(class = %self.name, filter = %filter, properties = members.len(), "Loaded properties");
        let members = Arc::new(members);
        cache.insert(filter, Arc::clone(&members));
        Ok(members)
    }

    pub fn has_property(&self, name: &str) -> bool {
        match self.properties(Modifiers::ALL) {
            Ok(members) => members.iter().any(|p| p.property_name() == name),
            Err(e) => {
                tracing::warn!(class = %self.name, property = name, error = %e, "Failed to load properties");
                false
            }
        }
    }

    pub fn property(&self, name: &str) -> DocmetaResult<Arc<ReflectionProperty>> {
        self.properties(Modifiers::ALL)?
            .iter()
            .find(|p| p.property_name() == name)
            .cloned()
            .ok_or_else(|| {
                ReflectionError::PropertyNotFound {
                    class: self.name.clone(),
                    name: name.to_string(),
                }
                .into()
            })
    }

    // ========================================================================
    // Type checks
    // ========================================================================

    /// True when this class, an ancestor, or an inherited interface
    /// declares `interface`.
    pub fn implements_interface(&self, interface: &str) -> DocmetaResult<bool> {
        let mut pending: Vec<String> = Vec::new();
        for class in self.lineage()? {
            pending.extend(class.interfaces.iter().cloned());
        }

        let mut visited = HashSet::new();
        while let Some(name) = pending.pop() {
            if name == interface {
                return Ok(true);
            }
            if !visited.insert(name.clone()) {
                continue;
            }
            if let Some(declared) = self.source.class(&name) {
                pending.extend(declared.interfaces.iter().cloned());
                pending.extend(declared.parent.iter().cloned());
            }
        }

        Ok(false)
    }

    pub fn is_interface(&self) -> DocmetaResult<bool> {
        Ok(self.descriptor()?.kind == ClassKind::Interface)
    }

    /// Interfaces count as abstract.
    pub fn is_abstract(&self) -> DocmetaResult<bool> {
        Ok(matches!(
            self.descriptor()?.kind,
            ClassKind::Abstract | ClassKind::Interface
        ))
    }

    // ========================================================================
    // Instantiation
    // ========================================================================

    pub fn new_instance<I>(&self, registry: &Registry, args: I) -> DocmetaResult<Instance>
    where
        I: IntoIterator<Item = Value>,
    {
        let args: Vec<Value> = args.into_iter().collect();
        self.new_instance_args(registry, &args)
    }

    /// Construct an instance through the factory registered under this
    /// class's name.
    pub fn new_instance_args(&self, registry: &Registry, args: &[Value]) -> DocmetaResult<Instance> {
        if self.is_abstract()? {
            return Err(ConstructionError::InvalidArguments {
                name: self.name.clone(),
                reason: "cannot instantiate an interface or abstract class".to_string(),
            }
            .into());
        }
        Ok(registry.new_instance_args(&self.name, args)?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// This class followed by its ancestors. Stops at a parent missing from
    /// the source or at an inheritance cycle.
    fn lineage(&self) -> DocmetaResult<Vec<Arc<ClassDescriptor>>> {
        let mut chain = vec![self.descriptor()?];
        let mut seen = HashSet::from([self.name.clone()]);

        while let Some(parent) = chain.last().and_then(|c| c.parent.clone()) {
            if !seen.insert(parent.clone()) {
                tracing::warn!(class = %self.name, parent = %parent, "Inheritance cycle");
                break;
            }
            match self.source.class(&parent) {
                Some(descriptor) => chain.push(descriptor),
                None => {
                    tracing::warn!(class = %self.name, parent = %parent, "Parent class not found");
                    break;
                }
            }
        }

        Ok(chain)
    }

    fn invalidate(&mut self) {
        self.annotations.reset();
        self.methods
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.properties
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn lookup(source: &dyn TypeSource, name: &str) -> Result<Arc<ClassDescriptor>, ReflectionError> {
    source
        .class(name)
        .ok_or_else(|| ReflectionError::ClassNotFound {
            name: name.to_string(),
        })
}

impl fmt::Display for ReflectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for ReflectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionClass")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("source", &self.source)
            .finish()
    }
}
