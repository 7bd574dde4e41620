//! Entity metadata and field resolution.
//!
//! Entity types describe their mapping to the remote service explicitly
//! through the [`Entity`] trait. A [`MetadataCache`] holds one resolved table
//! per type for the life of the process, and a [`FieldResolver`] uses a table
//! to turn field access nodes into wire names.

mod cache;
mod entity;
mod resolver;

pub use cache::MetadataCache;
pub use entity::{ContainerKind, Entity, EntityMetadata, FieldMetadata, KeyRole};
pub use resolver::{FieldResolver, RANGE_VARIABLE, ResolvedField};
