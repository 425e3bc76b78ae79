//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::traits::Cacheable;
use crate::error::{Error, Result};

/// Result of a cached query lookup.
#[derive(Debug, Clone)]
pub struct CachedQueryResult<T> {
  /// The cached entities in order
  pub entities: Vec<T>,
  /// When the query result was cached
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Store entities from a query result, replacing any previous result.
  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()>;

  /// Get cached entities for a query.
  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>>;

  /// Forget a query result. Entities stay while another query references them.
  fn invalidate(&self, key: &str) -> Result<()>;
}

/// Ordered entity keys for one query
#[derive(Debug)]
struct QueryEntry {
  entity_type: &'static str,
  entity_keys: Vec<String>,
  cached_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
  /// (entity_type, entity_key) -> serialized entity
  entities: HashMap<(&'static str, String), Vec<u8>>,
  /// query hash -> result
  queries: HashMap<String, QueryEntry>,
}

impl Tables {
  /// Drop entities no query refers to any more
  fn prune(&mut self) {
    let referenced: HashSet<(&'static str, &str)> = self
      .queries
      .values()
      .flat_map(|q| q.entity_keys.iter().map(|k| (q.entity_type, k.as_str())))
      .collect();

    self
      .entities
      .retain(|(entity_type, key), _| referenced.contains(&(*entity_type, key.as_str())));
  }
}

/// In-process cache storage. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  tables: Mutex<Tables>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
    self
      .tables
      .lock()
      .map_err(|e| Error::Cache(format!("Lock poisoned: {}", e)))
  }
}

impl CacheStorage for MemoryStorage {
  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()> {
    let mut tables = self.lock()?;
    let entity_type = T::entity_type();

    let mut entity_keys = Vec::with_capacity(entities.len());
    for entity in entities {
      let entity_key = entity.cache_key();
      let data = serde_json::to_vec(entity)
        .map_err(|e| Error::Cache(format!("Failed to serialize entity: {}", e)))?;

      tables
        .entities
        .insert((entity_type, entity_key.clone()), data);
      entity_keys.push(entity_key);
    }

    tables.queries.insert(
      key.to_string(),
      QueryEntry {
        entity_type,
        entity_keys,
        cached_at: Utc::now(),
      },
    );
    tables.prune();

    Ok(())
  }

  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>> {
    let tables = self.lock()?;
    let entity_type = T::entity_type();

    let entry = match tables.queries.get(key) {
      Some(entry) if entry.entity_type == entity_type => entry,
      _ => return Ok(None),
    };

    let entities = entry
      .entity_keys
      .iter()
      .map(|k| {
        let data = tables
          .entities
          .get(&(entity_type, k.clone()))
          .ok_or_else(|| Error::Cache(format!("Missing cached {} {}", entity_type, k)))?;
        serde_json::from_slice(data).map_err(|e| {
          Error::Cache(format!("Failed to deserialize cached {} {}: {}", entity_type, k, e))
        })
      })
      .collect::<Result<Vec<T>>>()?;

    Ok(Some(CachedQueryResult {
      entities,
      cached_at: entry.cached_at,
    }))
  }

  fn invalidate(&self, key: &str) -> Result<()> {
    let mut tables = self.lock()?;
    if tables.queries.remove(key).is_some() {
      tables.prune();
    }
    Ok(())
  }
}
