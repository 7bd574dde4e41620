//! Collaborator traits.
//!
//! The query layer never performs I/O. Execution is delegated to a
//! [`QueryProvider`] supplied by the caller.

mod provider;

pub use provider::{DEFAULT_STREAM_PAGE_SIZE, QueryProvider, paged_stream};
