//! Error types for fetching and caching job listings.

use thiserror::Error;

/// Result type alias using jobdeck's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the fetch and cache layers.
///
/// A by-id lookup that finds nothing is not an error; it resolves to `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
  /// Upstream answered with a non-success HTTP status
  #[error("Failed to fetch jobs: {status} {status_text}")]
  Fetch { status: u16, status_text: String },

  /// Response body was not the expected JSON
  #[error("Failed to decode job listings: {0}")]
  Decode(#[from] serde_json::Error),

  /// Connection, TLS or body read failure
  #[error("Request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Invalid API base URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  /// The task driving a query went away before sending a result
  #[error("Query was cancelled")]
  Cancelled,

  #[error("Cache error: {0}")]
  Cache(String),
}

impl Error {
  /// HTTP status code, if this failure came from an upstream response.
  pub fn status(&self) -> Option<u16> {
    match self {
      Error::Fetch { status, .. } => Some(*status),
      _ => None,
    }
  }
}
