//! Remotive job listings: API schema, normalization, HTTP client and caching.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod normalize;
pub mod types;

pub use cached_client::CachedJobsClient;
pub use types::Job;
