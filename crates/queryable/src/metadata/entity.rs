//! Entity and field metadata tables.
//!
//! Each entity type supplies its mapping once through [`Entity::metadata`]:
//! the container it lives in, fixed partition/row key values, and per-field
//! wire names, key roles, and enumeration descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::DataSettings;
use crate::error::MetadataError;
use crate::expr::EnumDescriptor;

/// A type that can be queried.
///
/// # Example
///
/// ```
/// use odata_queryable::metadata::{Entity, EntityMetadata, FieldMetadata};
///
/// struct User;
///
/// impl Entity for User {
///     fn metadata() -> EntityMetadata {
///         EntityMetadata::new("User")
///             .with_container("%UsersIndex%")
///             .with_field(FieldMetadata::new("Age").renamed("age"))
///     }
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    /// Builds the metadata table for this type. Must be a pure function.
    fn metadata() -> EntityMetadata;
}

/// Storage-native identity columns a field can stand in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyRole {
    /// The partition key column.
    Partition,
    /// The row key column.
    Row,
}

impl KeyRole {
    /// Returns the storage column name.
    pub fn storage_name(&self) -> &'static str {
        match self {
            KeyRole::Partition => "PartitionKey",
            KeyRole::Row => "RowKey",
        }
    }
}

/// Kind of container a descriptor targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A search index. Names are lower-cased.
    SearchIndex,
    /// A storage table. Names are kept verbatim.
    Table,
}

/// Mapping of one entity field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMetadata {
    name: String,
    wire_name: Option<String>,
    key_role: Option<KeyRole>,
    enum_type: Option<Arc<EnumDescriptor>>,
    element: Option<Arc<EntityMetadata>>,
}

impl FieldMetadata {
    /// Declares a field by its in-process identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wire_name: None,
            key_role: None,
            enum_type: None,
            element: None,
        }
    }

    /// Overrides the wire name.
    pub fn renamed(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    /// Marks the field as standing in for the partition key.
    pub fn partition_key(mut self) -> Self {
        self.key_role = Some(KeyRole::Partition);
        self
    }

    /// Marks the field as standing in for the row key.
    pub fn row_key(mut self) -> Self {
        self.key_role = Some(KeyRole::Row);
        self
    }

    /// Declares the field as enumerated.
    pub fn enumeration(mut self, descriptor: EnumDescriptor) -> Self {
        self.enum_type = Some(Arc::new(descriptor));
        self
    }

    /// Declares the field as a collection of complex elements.
    pub fn collection_of(mut self, element: EntityMetadata) -> Self {
        self.element = Some(Arc::new(element));
        self
    }

    /// Returns the in-process identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name sent over the wire. Key fields use the storage key
    /// column; other fields use the override or their identifier.
    pub fn wire_name(&self) -> &str {
        match self.key_role {
            Some(role) => role.storage_name(),
            None => self.wire_name.as_deref().unwrap_or(&self.name),
        }
    }

    /// Returns the key role, if the field is a substitute key.
    pub fn key_role(&self) -> Option<KeyRole> {
        self.key_role
    }

    /// Returns the enumeration descriptor, if the field is enumerated.
    pub fn enum_type(&self) -> Option<&Arc<EnumDescriptor>> {
        self.enum_type.as_ref()
    }

    /// Returns the element metadata, if the field is a complex collection.
    pub fn element(&self) -> Option<&Arc<EntityMetadata>> {
        self.element.as_ref()
    }
}

/// Mapping of one entity type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityMetadata {
    entity_name: String,
    container: Option<String>,
    partition_key: Option<String>,
    row_key: Option<String>,
    fields: HashMap<String, FieldMetadata>,
}

impl EntityMetadata {
    /// Creates an empty table for the named entity.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Default::default()
        }
    }

    /// Sets the declared index or table name. A `%key%` name is resolved
    /// through [`DataSettings::names`].
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Sets the fixed partition key value every row of this entity uses.
    pub fn with_partition_key(mut self, value: impl Into<String>) -> Self {
        self.partition_key = Some(value.into());
        self
    }

    /// Sets the fixed row key value.
    pub fn with_row_key(mut self, value: impl Into<String>) -> Self {
        self.row_key = Some(value.into());
        self
    }

    /// Adds a field mapping, replacing any earlier one with the same name.
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Returns the entity name.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Returns the declared container name, before indirection.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Returns the fixed partition key value.
    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    /// Returns the fixed row key value.
    pub fn row_key(&self) -> Option<&str> {
        self.row_key.as_deref()
    }

    /// Looks up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.get(name)
    }

    /// Iterates over declared fields in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.values()
    }

    /// Returns the wire name of a field, falling back to the identifier for
    /// undeclared fields.
    pub fn wire_name(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(field) => field.wire_name().to_string(),
            None => {
                tracing::trace!(
                    entity = %self.entity_name,
                    field = %name,
                    "Field not declared, using identifier as wire name"
                );
                name.to_string()
            }
        }
    }

    /// Resolves the container name for the given service.
    pub fn container_name(
        &self,
        settings: &DataSettings,
        kind: ContainerKind,
    ) -> Result<String, MetadataError> {
        let declared = self
            .container
            .as_deref()
            .ok_or_else(|| MetadataError::MissingContainer {
                entity: self.entity_name.clone(),
            })?;
        let resolved = settings.resolve_name(declared)?;
        Ok(match kind {
            ContainerKind::SearchIndex => resolved.to_lowercase(),
            ContainerKind::Table => resolved,
        })
    }
}
