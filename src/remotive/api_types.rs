//! Serde-deserializable types matching the Remotive API response.
//!
//! These types are separate from domain types so the upstream schema can be
//! decoded as-is while `Job` stays focused on what the views need.

use serde::{Deserialize, Deserializer};

/// Response envelope for `GET /api/remote-jobs`
#[derive(Debug, Deserialize)]
pub struct ApiJobsResponse {
  #[serde(rename = "0-legal-notice", default)]
  pub legal_notice: Option<String>,
  #[serde(rename = "job-count", default)]
  pub job_count: u64,
  #[serde(default)]
  pub jobs: Vec<ApiJob>,
}

/// A single job posting as the upstream API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct ApiJob {
  pub id: u64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub url: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub title: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub company_name: String,
  #[serde(default)]
  pub company_logo: Option<String>,
  /// Upstream display name of the category; `Job` does not carry it
  #[allow(dead_code)]
  #[serde(default, deserialize_with = "null_as_default")]
  pub category: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub job_type: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub publication_date: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub candidate_required_location: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub salary: String,
  // HTML
  #[serde(default, deserialize_with = "null_as_default")]
  pub description: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub tags: Vec<String>,
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
