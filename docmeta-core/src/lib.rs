//! Docmeta Core - Annotation Data Types
//!
//! Data structures shared by the parser and the reflection layer:
//! annotation values, materialized annotation records, parse configuration,
//! the error taxonomy, and the factory registry that replaces runtime class
//! loading.

pub mod annotation;
pub mod config;
pub mod error;
pub mod registry;
pub mod value;

pub use annotation::{Annotation, AnnotationSet};
pub use config::ReflectionConfig;
pub use error::{
    ConfigError, ConstructionError, DocmetaError, DocmetaResult, ParseError, ReflectionError,
};
pub use registry::{Instance, Registry};
pub use value::{Key, KeyLike, Value, Values};
