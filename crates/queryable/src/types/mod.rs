//! Result and pagination types.

mod pagination;

pub use pagination::{PaginatedRequest, PaginatedResponse, QueryPage};
