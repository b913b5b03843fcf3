//! Error types for docmeta operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookup failures on reflected entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectionError {
    #[error("The requested class {name} is not available")]
    ClassNotFound { name: String },

    #[error("The requested reflection annotation {name} is not available")]
    AnnotationNotFound { name: String },

    #[error("The requested reflection method {class}::{name} is not available")]
    MethodNotFound { class: String, name: String },

    #[error("The requested reflection property {class}::${name} is not available")]
    PropertyNotFound { class: String, name: String },

    #[error("The requested parameter ${name} of {class}::{method} is not available")]
    ParameterNotFound {
        class: String,
        method: String,
        name: String,
    },
}

/// Malformed annotation syntax, with the location of the offending token.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Failures constructing instances or invoking methods through a
/// [`Registry`](crate::Registry).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("No factory registered for {name}")]
    UnknownClass { name: String },

    #[error("No handler registered for {class}::{name}")]
    UnknownMethod { class: String, name: String },

    #[error("Invalid arguments for {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Type mismatch for {name}: expected {expected}")]
    TypeMismatch { name: String, expected: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Alias {alias} is claimed by both {first} and {second}")]
    AmbiguousAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Invalid manifest: {reason}")]
    Manifest { reason: String },
}

/// Master error type for all docmeta errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocmetaError {
    #[error("Reflection error: {0}")]
    Reflection(#[from] ReflectionError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl DocmetaError {
    /// True for the recoverable "name not present" family.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocmetaError::Reflection(_))
    }
}

/// Result type alias for docmeta operations.
pub type DocmetaResult<T> = Result<T, DocmetaError>;

// =============================================================================
// TESTS
// =============================================================================
