//! Typed queries for OData-style search and table services
//!
//! This crate turns predicate trees built in Rust into the boolean filter
//! grammar spoken by managed search-index and table-storage services, and
//! packages the filter together with ordering, projection and paging into
//! an immutable query descriptor that a provider executes.
//!
//! # Architecture
//!
//! - [`expr`] - Predicate trees, literal values and enumeration descriptors
//! - [`metadata`] - Entity metadata tables, the metadata cache and field resolution
//! - [`compiler`] - The filter compiler and its pluggable literal rules
//! - [`query`] - The query factory and copy-on-write descriptors
//! - [`core`] - The provider trait and paged streaming
//! - [`types`] - Result pages and offset pagination
//! - [`backends`] - Search-service and table-storage dialects
//! - [`config`] - Settings and container-name indirection
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use odata_queryable::metadata::{Entity, EntityMetadata, FieldMetadata};
//! use odata_queryable::{DataSettings, QueryContext};
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn metadata() -> EntityMetadata {
//!         EntityMetadata::new("User")
//!             .with_container("%UsersIndex%")
//!             .with_field(FieldMetadata::new("Age").renamed("age"))
//!             .with_field(FieldMetadata::new("Country").renamed("country"))
//!     }
//! }
//!
//! let settings = DataSettings::default().with_name("UsersIndex", "users");
//! let context = Arc::new(QueryContext::search(settings));
//!
//! let adults = context
//!     .query::<User>()
//!     .filter_by(|u| u.field("Age").ge(18).and(u.field("Country").eq("US")))
//!     .unwrap()
//!     .order_by_descending("Age")
//!     .take(10)
//!     .unwrap();
//!
//! assert_eq!(
//!     adults.filter_string(),
//!     Some("((age ge 18) and (country eq 'US'))")
//! );
//! assert_eq!(adults.order(), ["age desc"]);
//! ```
//!
//! # Dialects
//!
//! | Dialect | Compiler | Date literal | 64-bit integer |
//! |---------|----------|--------------|----------------|
//! | OData | [`FilterCompiler::odata`](compiler::FilterCompiler::odata) | `'2020-01-01T00:00:00Z'` | `5` |
//! | Search | [`FilterCompiler::search`](compiler::FilterCompiler::search) | `2020-01-01T00:00:00Z` | `5` |
//! | Table | [`FilterCompiler::table`](compiler::FilterCompiler::table) | `datetime'2020-01-01T00:00:00Z'` | `5L` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod compiler;
pub mod config;
pub mod core;
pub mod error;
pub mod expr;
pub mod metadata;
pub mod query;
pub mod types;

// Re-export commonly used types at crate root
pub use config::DataSettings;
pub use error::{QueryError, QueryResult};
pub use expr::{Expr, Param, Predicate, Value};
pub use query::{QueryContext, Queryable};
