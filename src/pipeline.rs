//! Ordered interceptor pipelines for header names and cell values.

use std::sync::Arc;

use crate::error::{BindError, BoxError};
use crate::record::PropertyMeta;
use crate::value::CellValue;

/// Common surface of both interceptor kinds.
///
/// `order` positions the interceptor in the pipeline: lower runs first,
/// ties resolve by registration order. `name` identifies the interceptor
/// in error context and for removal.
pub trait Interceptor: Send + Sync {
    fn order(&self) -> i32 {
        0
    }

    fn name(&self) -> &str;
}

/// Transforms a raw header string into (part of) a property name.
pub trait NameInterceptor: Interceptor {
    fn apply(&self, name: String) -> Result<String, BoxError>;
}

/// Transforms a resolved cell string into the value bound to the property.
///
/// Each step observes both the untouched original string and the value
/// accumulated by earlier steps.
pub trait ValueInterceptor: Interceptor {
    fn apply(
        &self,
        property: &PropertyMeta,
        original: &str,
        current: CellValue,
    ) -> Result<CellValue, BoxError>;
}

/// Ordered registration list of interceptors.
///
/// The list is kept sorted ascending by `order()`, stable by registration
/// for ties; sorting happens on registration change, not per read, so a
/// configured pipeline can serve concurrent parses through `&self`.
pub struct Pipeline<I: ?Sized> {
    entries: Vec<Arc<I>>,
}

impl<I: ?Sized> Default for Pipeline<I> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<I: ?Sized> Clone for Pipeline<I> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<I: Interceptor + ?Sized> Pipeline<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor; its `order()` decides where it runs.
    pub fn register(&mut self, interceptor: Arc<I>) {
        self.entries.push(interceptor);
        // Stable sort: a new entry lands after existing entries of equal order.
        self.entries.sort_by_key(|entry| entry.order());
    }

    /// Remove every interceptor with the given name. Returns true when at
    /// least one entry was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name() != name);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interceptors in effective execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<I>> {
        self.entries.iter()
    }
}

impl Pipeline<dyn NameInterceptor> {
    /// Fold the raw header string through every interceptor in order.
    pub fn transform(&self, raw: &str) -> Result<String, BindError> {
        let mut current = raw.to_string();
        for step in &self.entries {
            let before = current.clone();
            current = step.apply(current).map_err(|source| BindError::Interceptor {
                interceptor: step.name().to_string(),
                original: raw.to_string(),
                current: before,
                source,
            })?;
        }
        Ok(current)
    }
}

impl Pipeline<dyn ValueInterceptor> {
    /// Fold the resolved cell string through every interceptor in order,
    /// starting from `CellValue::Text(original)`.
    pub fn transform(
        &self,
        property: &PropertyMeta,
        original: &str,
    ) -> Result<CellValue, BindError> {
        let mut current = CellValue::Text(original.to_string());
        for step in &self.entries {
            let before = current.clone();
            current =
                step.apply(property, original, current)
                    .map_err(|source| BindError::Interceptor {
                        interceptor: step.name().to_string(),
                        original: original.to_string(),
                        current: before.to_string(),
                        source,
                    })?;
        }
        Ok(current)
    }
}

/// Stock name interceptor removing all whitespace, so `"First Name"`
/// matches a `FirstName` property.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimNames;

impl Interceptor for TrimNames {
    fn name(&self) -> &str {
        "TrimNames"
    }
}

impl NameInterceptor for TrimNames {
    fn apply(&self, name: String) -> Result<String, BoxError> {
        Ok(name.split_whitespace().collect())
    }
}
