//! Async query abstraction for data fetching in views.
//!
//! Inspired by TanStack Query, this module provides a `Query<T>` type that
//! encapsulates async data fetching, loading states, and error handling.
//! Caching and retries live in `CachedJobsClient`; a query only tracks what
//! the view should show.
//!
//! # Example
//!
//! ```ignore
//! let client = jobs_client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.fetch_jobs("software-dev", 50).await }
//! });
//!
//! // Start fetching
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.status() {
//!     QueryStatus::Loading => render_spinner(),
//!     QueryStatus::Success => render_data(query.data()),
//!     QueryStatus::Error(e) => render_error(e),
//!     QueryStatus::Idle => {}
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// The status of a query
#[derive(Debug)]
pub enum QueryStatus {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Last fetch completed successfully
  Success,
  /// Last fetch failed with an error
  Error(Error),
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Async query for data fetching with state management.
///
/// Query<T> encapsulates:
/// - The fetching logic (via a closure)
/// - Loading/success/error status
/// - The last successful data, kept while a refetch runs or after it fails
/// - Async result handling via channels
pub struct Query<T> {
  status: QueryStatus,
  data: Option<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    Self {
      status: QueryStatus::Idle,
      data: None,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn status(&self) -> &QueryStatus {
    &self.status
  }

  /// Data from the last successful fetch.
  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  /// True while a fetch runs and there is no data to show yet.
  pub fn is_loading(&self) -> bool {
    self.is_fetching() && self.data.is_none()
  }

  /// True while any fetch runs, including background refetches.
  pub fn is_fetching(&self) -> bool {
    matches!(self.status, QueryStatus::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self.status, QueryStatus::Success)
  }

  pub fn is_error(&self) -> bool {
    matches!(self.status, QueryStatus::Error(_))
  }

  /// The failure captured by the last fetch, if it failed.
  pub fn error(&self) -> Option<&Error> {
    match &self.status {
      QueryStatus::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Start fetching data if not already fetching.
  pub fn fetch(&mut self) {
    if self.is_fetching() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already fetching or data exists.
  ///
  /// A pending result from an earlier fetch is discarded.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.data = Some(data);
        self.status = QueryStatus::Success;
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.status = QueryStatus::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending
        self.status = QueryStatus::Error(Error::Cancelled);
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.status = QueryStatus::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // The receiver is gone if the view was dropped or refetched
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("status", &self.status)
      .field("data", &self.data)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  fn server_error() -> Error {
    Error::Fetch {
      status: 500,
      status_text: "Internal Server Error".to_string(),
    }
  }

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok(vec![1, 2, 3]) });

    assert!(matches!(query.status(), QueryStatus::Idle));

    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err(server_error()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_error());
    assert!(query.error().unwrap().to_string().contains("500"));
  }

  #[tokio::test]
  async fn test_data_survives_failed_refetch() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      let n = counter.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Ok(42)
        } else {
          Err(server_error())
        }
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();

    query.refetch();
    assert!(query.is_fetching());
    assert!(!query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();

    assert!(query.is_error());
    assert_eq!(query.data(), Some(&42));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(42)
      }
    });

    query.fetch();
    assert!(query.is_loading());

    query.fetch();
    assert!(query.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_cancels_pending() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(counter.fetch_add(1, Ordering::SeqCst))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Refetch should drop the first result and wait for the second
    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    query.poll();
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_poll_without_fetch() {
    let mut query = Query::new(|| async { Ok(1) });
    assert!(!query.poll());
    assert!(query.data().is_none());
  }
}
