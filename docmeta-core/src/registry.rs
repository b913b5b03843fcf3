//! Name → factory registry used to construct annotation and class instances

use crate::{ConstructionError, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A constructed instance. Downcast with [`Registry::new_instance_of`] or
/// `Box::downcast`.
pub type Instance = Box<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn(&[Value]) -> Result<Instance, ConstructionError> + Send + Sync>;
type Handler = Arc<dyn Fn(&dyn Any, &[Value]) -> Result<Value, ConstructionError> + Send + Sync>;

/// Registry of constructors keyed by canonical type name, plus method
/// handlers keyed by `(type name, method name)`.
///
/// Populate it once at startup; lookups never load code at runtime.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
    handlers: HashMap<(String, String), Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `name`. A second registration replaces
    /// the first.
    pub fn register<T, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&[Value]) -> Result<T, ConstructionError> + Send + Sync + 'static,
    {
        let factory: Factory =
            Arc::new(move |args: &[Value]| factory(args).map(|t| Box::new(t) as Instance));
        self.factories.insert(name.into(), factory);
        self
    }

    /// Register a handler invoked for `method` on instances of `T`
    /// registered as `class`.
    pub fn register_method<T, F>(
        &mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &[Value]) -> Result<Value, ConstructionError> + Send + Sync + 'static,
    {
        let class = class.into();
        let method = method.into();
        let expected = class.clone();
        let handler: Handler = Arc::new(move |target: &dyn Any, args: &[Value]| {
            let target = target
                .downcast_ref::<T>()
                .ok_or_else(|| ConstructionError::TypeMismatch {
                    name: expected.clone(),
                    expected: std::any::type_name::<T>().to_string(),
                })?;
            handler(target, args)
        });
        self.handlers.insert((class, method), handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn new_instance_args(&self, name: &str, args: &[Value]) -> Result<Instance, ConstructionError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConstructionError::UnknownClass {
                name: name.to_string(),
            })?;
        factory(args)
    }

    /// Construct and downcast to the concrete type.
    pub fn new_instance_of<T: Any>(&self, name: &str, args: &[Value]) -> Result<T, ConstructionError> {
        let instance = self.new_instance_args(name, args)?;
        match (instance as Box<dyn Any>).downcast::<T>() {
            Ok(t) => Ok(*t),
            Err(_) => Err(ConstructionError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    pub fn invoke_args(
        &self,
        class: &str,
        method: &str,
        target: &dyn Any,
        args: &[Value],
    ) -> Result<Value, ConstructionError> {
        let handler = self
            .handlers
            .get(&(class.to_string(), method.to_string()))
            .ok_or_else(|| ConstructionError::UnknownMethod {
                class: class.to_string(),
                name: method.to_string(),
            })?;
        handler(target, args)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry")
            .field("factories", &names)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
