//! Cached Remotive client that wraps JobsClient with transparent caching.

use crate::cache::{CacheLayer, MemoryStorage};
use crate::config::Config;
use crate::error::Result;
use tracing::debug;

use super::cache::JobsQueryKey;
use super::client::JobsClient;
use super::types::Job;

/// Remotive client with transparent caching support.
///
/// This wraps the underlying JobsClient and provides the same API, adding
/// the freshness window, retries and per-key deduplication of `CacheLayer`.
/// Clones share one cache.
#[derive(Clone)]
pub struct CachedJobsClient {
  inner: JobsClient,
  cache: CacheLayer<MemoryStorage>,
}

impl CachedJobsClient {
  /// Create a new cached client with its own empty cache.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = JobsClient::new(&config.api)?;
    let cache = CacheLayer::new(MemoryStorage::new())
      .with_stale_time(config.stale_time())
      .with_retries(config.cache.retries);

    Ok(Self { inner, cache })
  }

  /// Fetch jobs for a category with caching.
  pub async fn fetch_jobs(&self, category: &str, limit: u32) -> Result<Vec<Job>> {
    let query_key = listings_key(category, limit);

    let result = self
      .cache
      .fetch_list(&query_key, || {
        let inner = self.inner.clone();
        let category = category.to_string();
        async move { inner.fetch_jobs(&category, limit).await }
      })
      .await?;

    debug!(
      category,
      count = result.data.len(),
      source = ?result.source,
      cached_at = ?result.cached_at,
      "Served job listings"
    );
    Ok(result.data)
  }

  /// Get a single job by id with caching. `None` means not found.
  pub async fn fetch_job_by_id(&self, id: &str) -> Result<Option<Job>> {
    let query_key = detail_key(id);

    let result = self
      .cache
      .fetch_optional(&query_key, || {
        let inner = self.inner.clone();
        let id = id.to_string();
        async move { inner.fetch_job_by_id(&id).await }
      })
      .await?;

    debug!(id, found = result.data.is_some(), source = ?result.source, "Served job lookup");
    Ok(result.data)
  }

  /// Forget cached listings so the next fetch hits the network.
  pub fn invalidate_jobs(&self, category: &str, limit: u32) -> Result<()> {
    self.cache.invalidate(&listings_key(category, limit))
  }

  /// Forget a cached by-id lookup.
  pub fn invalidate_job(&self, id: &str) -> Result<()> {
    self.cache.invalidate(&detail_key(id))
  }
}

fn listings_key(category: &str, limit: u32) -> JobsQueryKey {
  JobsQueryKey::Listings {
    category: category.to_string(),
    limit,
  }
}

fn detail_key(id: &str) -> JobsQueryKey {
  JobsQueryKey::JobDetail { id: id.to_string() }
}
