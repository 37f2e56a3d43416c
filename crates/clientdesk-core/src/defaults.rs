//! Default values shared across crates.

/// Default page size for list queries.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Default pagination offset.
pub const DEFAULT_LIST_SKIP: i64 = 0;
