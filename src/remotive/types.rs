use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Salary value used when the posting does not state one
pub const SALARY_NOT_SPECIFIED: &str = "Not specified";

/// A job listing, normalized from the upstream record.
///
/// Fields are only writable inside `remotive`; the rest of the crate reads
/// them through accessors, so a `Job` never changes after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
  pub(super) id: String,
  pub(super) title: String,
  pub(super) company_name: String,
  pub(super) company_logo: Option<String>,
  pub(super) short_description: String,
  pub(super) full_description: String,
  pub(super) location: String,
  pub(super) job_type: String,
  pub(super) posted_date: String,
  pub(super) apply_url: String,
  pub(super) salary: String,
  pub(super) tags: Vec<String>,
}

impl Job {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn company_name(&self) -> &str {
    &self.company_name
  }

  pub fn company_logo(&self) -> Option<&str> {
    self.company_logo.as_deref()
  }

  /// Plain-text preview, at most 150 characters plus "..."
  pub fn short_description(&self) -> &str {
    &self.short_description
  }

  /// Plain-text description, untruncated
  pub fn full_description(&self) -> &str {
    &self.full_description
  }

  pub fn location(&self) -> &str {
    &self.location
  }

  pub fn job_type(&self) -> &str {
    &self.job_type
  }

  /// Publication timestamp exactly as the API sent it
  pub fn posted_date(&self) -> &str {
    &self.posted_date
  }

  pub fn apply_url(&self) -> &str {
    &self.apply_url
  }

  pub fn salary(&self) -> &str {
    &self.salary
  }

  pub fn tags(&self) -> &[String] {
    &self.tags
  }

  pub fn has_salary(&self) -> bool {
    !self.salary.is_empty() && self.salary != SALARY_NOT_SPECIFIED
  }

  /// Parse `posted_date` into an instant.
  ///
  /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` timestamp (read as
  /// UTC, which is what the API sends), or a bare `YYYY-MM-DD` date.
  pub fn posted_at(&self) -> Option<DateTime<Utc>> {
    parse_posted_date(&self.posted_date)
  }
}

pub fn parse_posted_date(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }

  if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(dt.and_utc());
  }

  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Datelike, Timelike};

  #[test]
  fn test_parse_naive_timestamp() {
    let dt = parse_posted_date("2024-05-02T10:01:13").unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 5, 2));
    assert_eq!(dt.hour(), 10);
  }

  #[test]
  fn test_parse_rfc3339_converts_to_utc() {
    let dt = parse_posted_date("2024-05-02T10:00:00+02:00").unwrap();
    assert_eq!(dt.hour(), 8);
  }

  #[test]
  fn test_parse_date_only() {
    let dt = parse_posted_date("2024-03-01").unwrap();
    assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 1, 0));
  }

  #[test]
  fn test_parse_garbage() {
    assert!(parse_posted_date("last tuesday").is_none());
    assert!(parse_posted_date("").is_none());
  }
}
