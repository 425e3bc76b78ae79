//! Caching implementations for Remotive types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::Job;

impl Cacheable for Job {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "job"
  }
}

/// Query key types for Remotive API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobsQueryKey {
  /// Job listings for a category
  Listings { category: String, limit: u32 },
  /// A single job looked up by id
  JobDetail { id: String },
}

impl QueryKey for JobsQueryKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::Listings { category, limit } => {
        format!("listings:{}:{}", category, limit)
      }
      Self::JobDetail { id } => format!("job_detail:{}", id),
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::Listings { category, limit } => format!("{} jobs in {}", limit, category),
      Self::JobDetail { id } => format!("job {}", id),
    }
  }
}
