//! Docmeta Reflect - Memoized Annotation Metadata
//!
//! Reflection entities for classes, methods, properties and parameters.
//! Each entity reads its doc comment from a [`TypeSource`], parses the
//! annotations once with its own [`ReflectionConfig`](docmeta_core::ReflectionConfig)
//! and serves every later query from the cached
//! [`AnnotationSet`](docmeta_core::AnnotationSet).
//!
//! ```
//! use docmeta_reflect::{Catalog, ClassDescriptor, ReflectionClass};
//!
//! let source = Catalog::new()
//!     .with_class(ClassDescriptor::new("App\\User").with_doc("/** @Entity(table=\"users\") */"))
//!     .into_source();
//! let class = ReflectionClass::new("App\\User", source);
//!
//! assert!(class.has_annotation("Entity"));
//! assert_eq!(class.annotation_loads(), 1);
//! ```

mod annotated;
pub mod catalog;
pub mod class;
pub mod memo;
pub mod method;
pub mod parameter;
pub mod property;
pub mod source;

pub use catalog::{Catalog, Manifest};
pub use class::{Members, ReflectionClass};
pub use memo::Memo;
pub use method::ReflectionMethod;
pub use parameter::ReflectionParameter;
pub use property::ReflectionProperty;
pub use source::{
    ClassDescriptor, ClassKind, MethodDescriptor, Modifiers, ParameterDescriptor,
    PropertyDescriptor, TypeSource,
};
