//! Generic caching layer for fetched query results.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Caches entities by key, shared between the queries that return them
//! - Serves results without refetching inside a freshness window
//! - Retries failed fetches a fixed number of times
//! - Lets only one fetch per key run at a time
//!
//! Storage is in-memory only.

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::MemoryStorage;
pub use traits::{Cacheable, QueryKey};
