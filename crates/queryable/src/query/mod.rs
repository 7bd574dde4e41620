//! Query descriptors.
//!
//! A [`QueryContext`] is the factory for [`Queryable`] descriptors. Callers
//! chain copy-on-write operations on a descriptor and hand the result to a
//! [`QueryProvider`](crate::core::QueryProvider) for execution.

mod context;
mod queryable;

pub use context::QueryContext;
pub use queryable::Queryable;
