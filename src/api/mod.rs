//! API response envelopes and pagination

pub mod pagination;
pub mod response;

pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use response::{Created, DataResponse, NoContent, OutcomeResponse};
