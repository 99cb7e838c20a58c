//! Feed module
//!
//! A state holder that binds a [`DefaultPaginator`](crate::pagination::DefaultPaginator)
//! to a [`PaginationState`](crate::pagination::PaginationState) and publishes
//! every change to observers, the way a screen's view-model would.

mod holder;

pub use holder::Feed;
