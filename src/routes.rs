/// Navigation targets, addressed by path.
///
/// - `/` is the job list
/// - `/jobs/:jobId` is the detail view for one job
///
/// Anything else falls back to the job list. The list's current page is
/// view state and never part of a route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
  #[default]
  JobList,
  JobDetail(String),
}

impl Route {
  pub fn parse(path: &str) -> Self {
    let segments: Vec<&str> = path
      .trim()
      .trim_matches('/')
      .split('/')
      .filter(|s| !s.is_empty())
      .collect();

    match segments.as_slice() {
      ["jobs", id] => Route::JobDetail(id.to_string()),
      _ => Route::JobList,
    }
  }

  pub fn path(&self) -> String {
    match self {
      Route::JobList => "/".to_string(),
      Route::JobDetail(id) => format!("/jobs/{}", id),
    }
  }
}
