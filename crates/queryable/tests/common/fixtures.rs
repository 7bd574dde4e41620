//! Entity fixtures.
//!
//! [`User`] lives in a search index, [`Order`] in a storage table.

use std::sync::Arc;

use odata_queryable::DataSettings;
use odata_queryable::compiler::FilterCompiler;
use odata_queryable::expr::EnumDescriptor;
use odata_queryable::metadata::{Entity, EntityMetadata, FieldMetadata};
use odata_queryable::query::QueryContext;

/// Account status of a user.
pub fn status_enum() -> EnumDescriptor {
    EnumDescriptor::new("Status")
        .with_member("Active", 1)
        .with_aliased_member("Suspended", 2, "on-hold")
        .with_member("Deleted", 3)
}

/// A user document.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Document key.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i32,
    /// ISO country code.
    pub country: String,
}

impl User {
    /// Creates a user with a generated name.
    pub fn new(id: u32, age: i32, country: &str) -> Self {
        Self {
            id,
            name: format!("user-{}", id),
            age,
            country: country.to_string(),
        }
    }
}

impl Entity for User {
    fn metadata() -> EntityMetadata {
        EntityMetadata::new("User")
            .with_container("%UsersIndex%")
            .with_field(FieldMetadata::new("Id").renamed("id"))
            .with_field(FieldMetadata::new("Name").renamed("name"))
            .with_field(FieldMetadata::new("Age").renamed("age"))
            .with_field(FieldMetadata::new("Country").renamed("country"))
            .with_field(FieldMetadata::new("Active").renamed("active"))
            .with_field(FieldMetadata::new("Score").renamed("score"))
            .with_field(FieldMetadata::new("JoinedAt").renamed("joined_at"))
            .with_field(
                FieldMetadata::new("Status")
                    .renamed("status")
                    .enumeration(status_enum()),
            )
            .with_field(FieldMetadata::new("Tags").renamed("tags"))
            .with_field(
                FieldMetadata::new("Addresses")
                    .renamed("addresses")
                    .collection_of(
                        EntityMetadata::new("Address")
                            .with_field(FieldMetadata::new("City").renamed("city"))
                            .with_field(FieldMetadata::new("Zip").renamed("zip")),
                    ),
            )
    }
}

/// An order row.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Row key.
    pub id: i64,
    /// Order total.
    pub total: f64,
}

impl Entity for Order {
    fn metadata() -> EntityMetadata {
        EntityMetadata::new("Order")
            .with_container("%OrdersTable%")
            .with_partition_key("orders")
            .with_field(FieldMetadata::new("Id").row_key())
            .with_field(FieldMetadata::new("Customer").renamed("customer"))
            .with_field(FieldMetadata::new("Total").renamed("total"))
            .with_field(FieldMetadata::new("Quantity").renamed("quantity"))
            .with_field(FieldMetadata::new("PlacedAt").renamed("placed_at"))
    }
}

/// Creates `count` users with ids starting at 1.
pub fn users(count: u32) -> Vec<User> {
    (1..=count)
        .map(|id| User::new(id, 18 + (id % 50) as i32, if id % 2 == 0 { "US" } else { "NZ" }))
        .collect()
}

/// Settings resolving both fixture containers.
pub fn settings() -> DataSettings {
    DataSettings::default()
        .with_name("UsersIndex", "Users-Test")
        .with_name("OrdersTable", "OrdersTest")
}

/// A general-purpose OData context.
pub fn odata_context() -> Arc<QueryContext> {
    Arc::new(QueryContext::new(FilterCompiler::odata()).with_settings(settings()))
}

/// A search-service context.
pub fn search_context() -> Arc<QueryContext> {
    Arc::new(QueryContext::search(settings()))
}

/// A table-storage context.
pub fn table_context() -> Arc<QueryContext> {
    Arc::new(QueryContext::table(settings()))
}
