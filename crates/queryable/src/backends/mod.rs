//! Service dialects.
//!
//! Each dialect bundles a literal formatter, a [`FilterCompiler`](crate::compiler::FilterCompiler)
//! constructor, a [`QueryContext`](crate::query::QueryContext) constructor,
//! and a transport-neutral request description for provider implementors.

pub mod search;
pub mod table;

pub use search::{
    QueryType, SearchLiteralFormatter, SearchMode, SearchOptions, SearchQueryExt, SearchRequest,
};
pub use table::{TableLiteralFormatter, TableRequest};
