//! Annotation cache shared by every reflected entity

use crate::memo::Memo;
use docmeta_core::{
    Annotation, AnnotationSet, DocmetaResult, ReflectionConfig, ReflectionError,
};
use docmeta_dsl::from_doc_comment;
use std::fmt;

/// Memoized annotation set of one entity.
#[derive(Debug, Default)]
pub(crate) struct AnnotationCache {
    memo: Memo<AnnotationSet>,
}

impl AnnotationCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Parse the entity's doc comment on first access.
    ///
    /// `doc` runs only when the cache is empty; a failure is returned and
    /// leaves the cache empty.
    pub(crate) fn load<F>(
        &self,
        entity: &dyn fmt::Display,
        config: &ReflectionConfig,
        doc: F,
    ) -> DocmetaResult<&AnnotationSet>
    where
        F: FnOnce() -> DocmetaResult<Option<String>>,
    {
        self.memo.get_or_try_init(|| {
            let doc = doc()?;
            let set = from_doc_comment(doc.as_deref(), config)?;
            tracing::debug!(entity = %entity, annotations = set.len(), "Loaded annotations");
            Ok(set)
        })
    }

    pub(crate) fn loads(&self) -> usize {
        self.memo.computations()
    }

    pub(crate) fn reset(&mut self) {
        self.memo.reset();
    }
}

/// `has_annotation` for any entity: a failed load is logged and reads as
/// absent.
pub(crate) fn has_annotation(
    entity: &dyn fmt::Display,
    annotations: DocmetaResult<&AnnotationSet>,
    name: &str,
) -> bool {
    match annotations {
        Ok(set) => set.contains(name),
        Err(e) => {
            tracing::warn!(entity = %entity, annotation = name, error = %e, "Failed to load annotations");
            false
        }
    }
}

pub(crate) fn annotation<'a>(
    annotations: DocmetaResult<&'a AnnotationSet>,
    name: &str,
) -> DocmetaResult<&'a Annotation> {
    annotations?.get(name).ok_or_else(|| {
        ReflectionError::AnnotationNotFound {
            name: name.to_string(),
        }
        .into()
    })
}
