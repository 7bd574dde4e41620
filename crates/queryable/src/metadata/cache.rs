//! Process-wide metadata cache.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::MetadataError;

use super::entity::{Entity, EntityMetadata};

/// Cache of entity metadata keyed by type.
///
/// Entries are populated lazily on first access and never evicted. Concurrent
/// first accesses may each compute the metadata; the first insert wins and
/// every caller observes that one value.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<TypeId, Arc<EntityMetadata>>>,
}

impl MetadataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metadata for `E`, computing it on a miss.
    pub fn get<E: Entity>(&self) -> Arc<EntityMetadata> {
        let id = TypeId::of::<E>();
        let cached = self.entries.read().get(&id).cloned();
        if let Some(metadata) = cached {
            return metadata;
        }

        // Computed outside the lock; E::metadata() is pure so a lost race only wastes work.
        let computed = Arc::new(E::metadata());

        let mut entries = self.entries.write();
        match entries.entry(id) {
            Entry::Occupied(existing) => {
                debug!(
                    entity = type_name::<E>(),
                    "Metadata populated concurrently, discarding local copy"
                );
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                debug!(
                    entity = type_name::<E>(),
                    fields = computed.fields().count(),
                    "Cached entity metadata"
                );
                slot.insert(computed).clone()
            }
        }
    }

    /// Registers metadata for `E` ahead of first use.
    ///
    /// Fails when `E` already has an entry, whether registered or computed.
    pub fn register<E: Entity>(
        &self,
        metadata: EntityMetadata,
    ) -> Result<Arc<EntityMetadata>, MetadataError> {
        let mut entries = self.entries.write();
        match entries.entry(TypeId::of::<E>()) {
            Entry::Occupied(_) => Err(MetadataError::AlreadyRegistered {
                entity: type_name::<E>().to_string(),
            }),
            Entry::Vacant(slot) => {
                debug!(entity = type_name::<E>(), "Registered entity metadata");
                Ok(slot.insert(Arc::new(metadata)).clone())
            }
        }
    }

    /// Returns true if `E` has an entry.
    pub fn contains<E: Entity>(&self) -> bool {
        self.entries.read().contains_key(&TypeId::of::<E>())
    }

    /// Returns the number of cached entity types.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
