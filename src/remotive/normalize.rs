//! Conversion from upstream records to the `Job` domain type.

use scraper::Html;

use super::api_types::ApiJob;
use super::types::{Job, SALARY_NOT_SPECIFIED};

/// Maximum length of the short description before the ellipsis
pub const SHORT_DESCRIPTION_MAX: usize = 150;

const ELLIPSIS: &str = "...";

/// Defaults for string fields the API may leave empty, keyed by field name.
/// Each field is defaulted on its own.
const FIELD_DEFAULTS: &[(&str, &str)] = &[
  ("location", "Remote"),
  ("type", "Full-time"),
  ("salary", SALARY_NOT_SPECIFIED),
];

fn or_default(field: &str, value: String) -> String {
  if !value.is_empty() {
    return value;
  }
  FIELD_DEFAULTS
    .iter()
    .find(|(name, _)| *name == field)
    .map(|(_, default)| default.to_string())
    .unwrap_or(value)
}

/// Strip markup from an HTML fragment, keeping only its text content.
pub fn strip_html(html: &str) -> String {
  Html::parse_fragment(html)
    .root_element()
    .text()
    .collect()
}

/// Build a preview from already-stripped text.
///
/// Counts characters, not bytes, and cuts at exactly `max_len` even in the
/// middle of a word.
pub fn short_description(stripped: &str, max_len: usize) -> String {
  if stripped.chars().count() <= max_len {
    return stripped.to_string();
  }

  let head: String = stripped.chars().take(max_len).collect();
  format!("{}{}", head.trim_end(), ELLIPSIS)
}

/// Map one upstream record to a `Job`. Never fails.
pub fn normalize(api: ApiJob) -> Job {
  let full_description = strip_html(&api.description);
  let short_description = short_description(&full_description, SHORT_DESCRIPTION_MAX);

  Job {
    id: api.id.to_string(),
    title: api.title,
    company_name: api.company_name,
    company_logo: api.company_logo,
    short_description,
    full_description,
    location: or_default("location", api.candidate_required_location),
    job_type: or_default("type", api.job_type),
    posted_date: api.publication_date,
    apply_url: api.url,
    salary: or_default("salary", api.salary),
    tags: api.tags,
  }
}

impl From<ApiJob> for Job {
  fn from(api: ApiJob) -> Self {
    normalize(api)
  }
}

/// Builders for upstream records, shared by tests across the crate.
#[cfg(test)]
pub(crate) mod fixtures {
  use super::*;

  pub fn api_job(id: u64, publication_date: &str, description: &str) -> ApiJob {
    ApiJob {
      id,
      url: format!("https://remotive.com/remote-jobs/software-dev/job-{}", id),
      title: format!("Engineer #{}", id),
      company_name: "Acme".to_string(),
      company_logo: None,
      category: "Software Development".to_string(),
      job_type: "full_time".to_string(),
      publication_date: publication_date.to_string(),
      candidate_required_location: "Worldwide".to_string(),
      salary: "$100k".to_string(),
      description: description.to_string(),
      tags: vec!["rust".to_string()],
    }
  }

  pub fn job(id: u64, publication_date: &str) -> Job {
    normalize(api_job(id, publication_date, "<p>Job description</p>"))
  }
}
