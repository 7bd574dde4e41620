//! Query factory.

use std::sync::Arc;

use crate::compiler::FilterCompiler;
use crate::config::DataSettings;
use crate::metadata::{Entity, MetadataCache};

use super::queryable::Queryable;

/// Shared state every descriptor of one service refers to: the filter
/// dialect, the metadata cache, and the settings.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use odata_queryable::compiler::FilterCompiler;
/// use odata_queryable::metadata::{Entity, EntityMetadata, FieldMetadata};
/// use odata_queryable::query::QueryContext;
///
/// struct User;
///
/// impl Entity for User {
///     fn metadata() -> EntityMetadata {
///         EntityMetadata::new("User").with_field(FieldMetadata::new("Age").renamed("age"))
///     }
/// }
///
/// let context = Arc::new(QueryContext::new(FilterCompiler::odata()));
/// let query = context
///     .query::<User>()
///     .filter_by(|u| u.field("Age").ge(18))
///     .unwrap();
/// assert_eq!(query.filter_string(), Some("(age ge 18)"));
/// ```
#[derive(Debug)]
pub struct QueryContext {
    compiler: FilterCompiler,
    cache: Arc<MetadataCache>,
    settings: DataSettings,
}

impl QueryContext {
    /// Creates a context with a private cache and default settings.
    pub fn new(compiler: FilterCompiler) -> Self {
        Self {
            compiler,
            cache: Arc::new(MetadataCache::new()),
            settings: DataSettings::default(),
        }
    }

    /// Shares a metadata cache with other contexts.
    pub fn with_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: DataSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the filter compiler.
    pub fn compiler(&self) -> &FilterCompiler {
        &self.compiler
    }

    /// Returns the metadata cache.
    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Returns the settings.
    pub fn settings(&self) -> &DataSettings {
        &self.settings
    }

    /// Starts an empty descriptor over `E`.
    pub fn query<E: Entity>(self: &Arc<Self>) -> Queryable<E> {
        let metadata = self.cache.get::<E>();
        Queryable::new(self.clone(), metadata)
    }
}
