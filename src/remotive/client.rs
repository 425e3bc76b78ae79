use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::remotive::api_types::ApiJobsResponse;
use crate::remotive::types::Job;
use tracing::{debug, info};
use url::Url;

/// Remotive API client.
///
/// Issues exactly one request per call and never retries; retrying is the
/// cache layer's job.
#[derive(Clone)]
pub struct JobsClient {
  http: reqwest::Client,
  base_url: Url,
  category: String,
  detail_limit: u32,
}

impl JobsClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("jobdeck/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      base_url: Url::parse(&config.base_url)?,
      category: config.category.clone(),
      detail_limit: config.detail_limit,
    })
  }

  fn listings_url(&self, category: &str, limit: u32) -> Url {
    let mut url = self.base_url.clone();
    url
      .query_pairs_mut()
      .append_pair("category", category)
      .append_pair("limit", &limit.to_string());
    url
  }

  /// Fetch jobs for a category, normalized and in upstream order
  pub async fn fetch_jobs(&self, category: &str, limit: u32) -> Result<Vec<Job>> {
    let url = self.listings_url(category, limit);
    debug!(%url, "Fetching jobs");

    let response = self.http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::Fetch {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
      });
    }

    let body = response.bytes().await?;
    let data: ApiJobsResponse = serde_json::from_slice(&body)?;
    if let Some(notice) = &data.legal_notice {
      debug!(%notice, "Upstream legal notice");
    }

    let jobs: Vec<Job> = data.jobs.into_iter().map(Job::from).collect();
    info!(
      category,
      limit,
      count = jobs.len(),
      job_count = data.job_count,
      "Fetched jobs"
    );

    Ok(jobs)
  }

  /// Look up a single job by id.
  ///
  /// The API has no single-job endpoint, so this fetches the first
  /// `detail_limit` jobs of the configured category and scans them. Jobs
  /// outside that window cannot be found this way and come back as `None`.
  pub async fn fetch_job_by_id(&self, id: &str) -> Result<Option<Job>> {
    let jobs = self.fetch_jobs(&self.category, self.detail_limit).await?;
    Ok(jobs.into_iter().find(|job| job.id() == id))
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use super::*;
  use serde_json::{json, Value};

  pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
      base_url: base_url.to_string(),
      ..ApiConfig::default()
    }
  }

  pub fn job_json(id: u64, publication_date: &str) -> Value {
    json!({
      "id": id,
      "url": format!("https://remotive.com/remote-jobs/software-dev/job-{}", id),
      "title": format!("Engineer #{}", id),
      "company_name": "Acme",
      "company_logo": null,
      "category": "Software Development",
      "job_type": "full_time",
      "publication_date": publication_date,
      "candidate_required_location": "",
      "salary": "",
      "description": format!("<p>Role <b>{}</b></p>", id),
      "tags": []
    })
  }

  pub fn listings_json(ids: impl IntoIterator<Item = u64>) -> Value {
    let jobs: Vec<Value> = ids
      .into_iter()
      .map(|id| job_json(id, "2024-01-01T00:00:00"))
      .collect();
    json!({
      "0-legal-notice": "notice",
      "job-count": jobs.len(),
      "jobs": jobs
    })
  }
}

#[cfg(test)]
mod tests {
  use super::test_support::{api_config, listings_json};
  use super::*;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  async fn client_for(server: &MockServer) -> JobsClient {
    JobsClient::new(&api_config(&format!("{}/api/remote-jobs", server.uri()))).unwrap()
  }

  #[tokio::test]
  async fn test_fetch_jobs_sends_category_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/remote-jobs"))
      .and(query_param("category", "software-dev"))
      .and(query_param("limit", "50"))
      .respond_with(ResponseTemplate::new(200).set_body_json(listings_json([3, 1, 2])))
      .expect(1)
      .mount(&server)
      .await;

    let client = client_for(&server).await;
    let jobs = client.fetch_jobs("software-dev", 50).await.unwrap();

    let ids: Vec<&str> = jobs.iter().map(|j| j.id()).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
    assert_eq!(jobs[0].full_description(), "Role 3");
    assert_eq!(jobs[0].location(), "Remote");
    assert_eq!(jobs[0].salary(), "Not specified");
  }

  #[tokio::test]
  async fn test_fetch_jobs_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let client = client_for(&server).await;
    let err = client.fetch_jobs("software-dev", 50).await.unwrap_err();

    assert!(matches!(err, Error::Fetch { status: 500, .. }));
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("Internal Server Error"));
  }

  #[tokio::test]
  async fn test_fetch_jobs_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
      .mount(&server)
      .await;

    let client = client_for(&server).await;
    let err = client.fetch_jobs("software-dev", 50).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
  }

  #[tokio::test]
  async fn test_fetch_job_by_id_scans_first_hundred() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(query_param("limit", "100"))
      .respond_with(ResponseTemplate::new(200).set_body_json(listings_json(1..=100)))
      .expect(2)
      .mount(&server)
      .await;

    let client = client_for(&server).await;

    let found = client.fetch_job_by_id("57").await.unwrap();
    assert_eq!(found.map(|j| j.title().to_string()), Some("Engineer #57".to_string()));

    let missing = client.fetch_job_by_id("101").await.unwrap();
    assert!(missing.is_none());
  }

  #[tokio::test]
  async fn test_fetch_job_by_id_propagates_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let client = client_for(&server).await;
    let err = client.fetch_job_by_id("1").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
  }

  #[test]
  fn test_invalid_base_url() {
    let result = JobsClient::new(&api_config("not a url"));
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
  }
}
