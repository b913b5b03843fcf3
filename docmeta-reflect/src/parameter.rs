//! Reflected method parameters

use crate::source::TypeSource;
use docmeta_core::{DocmetaResult, ReflectionError};
use std::fmt;
use std::sync::Arc;

/// One parameter of a method, identified by name.
#[derive(Clone)]
pub struct ReflectionParameter {
    class_name: String,
    method_name: String,
    parameter_name: String,
    source: Arc<dyn TypeSource>,
}

impl ReflectionParameter {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        parameter_name: impl Into<String>,
        source: Arc<dyn TypeSource>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            parameter_name: parameter_name.into(),
            source,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// Zero-based position in the method signature.
    pub fn position(&self) -> DocmetaResult<usize> {
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
        let position = method
            .position_of(&self.parameter_name)
            .ok_or_else(|| ReflectionError::ParameterNotFound {
                class: self.class_name.clone(),
                method: self.method_name.clone(),
                name: self.parameter_name.clone(),
            })?;
        Ok(position)
    }
}

impl fmt::Display for ReflectionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(${})", self.class_name, self.method_name, self.parameter_name)
    }
}

impl fmt::Debug for ReflectionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionParameter")
            .field("class_name", &self.class_name)
            .field("method_name", &self.method_name)
            .field("parameter_name", &self.parameter_name)
            .finish()
    }
}

impl PartialEq for ReflectionParameter {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.method_name == other.method_name
            && self.parameter_name == other.parameter_name
    }
}
