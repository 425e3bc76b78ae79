use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Remotive listings endpoint
pub const DEFAULT_API_URL: &str = "https://remotive.com/api/remote-jobs";

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "JOBDECK_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for header (defaults to "Remote Jobs" if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Category slug passed to the listings endpoint
  pub category: String,
  /// Number of jobs requested for the list view
  pub limit: u32,
  /// Number of jobs scanned when looking a job up by id
  pub detail_limit: u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_API_URL.to_string(),
      category: "software-dev".to_string(),
      limit: 50,
      detail_limit: 100,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Minutes a fetched result is served without refetching
  pub stale_minutes: i64,
  /// Additional attempts after a failed fetch
  pub retries: u32,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_minutes: 5,
      retries: 2,
    }
  }
}

impl Config {
  /// Load configuration from file, falling back to defaults.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./jobdeck.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jobdeck/config.yaml
  ///
  /// `JOBDECK_API_URL` overrides the API base URL either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      if !url.trim().is_empty() {
        config.api.base_url = url;
      }
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("jobdeck.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jobdeck").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Title shown in the header bar
  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("Remote Jobs")
  }

  pub fn stale_time(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.cache.stale_minutes.max(0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
    assert_eq!(config.api.category, "software-dev");
    assert_eq!(config.api.limit, 50);
    assert_eq!(config.api.detail_limit, 100);
    assert_eq!(config.cache.retries, 2);
    assert_eq!(config.stale_time(), chrono::Duration::minutes(5));
    assert_eq!(config.title(), "Remote Jobs");
  }

  #[test]
  fn test_parse_partial_yaml_keeps_defaults() {
    let yaml = r#"
title: Rust Jobs
api:
  category: devops
cache:
  retries: 0
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.title(), "Rust Jobs");
    assert_eq!(config.api.category, "devops");
    assert_eq!(config.api.limit, 50);
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
    assert_eq!(config.cache.retries, 0);
    assert_eq!(config.cache.stale_minutes, 5);
  }

  #[test]
  fn test_parse_empty_file() {
    let config = Config::parse("  \n").unwrap();
    assert_eq!(config.api.limit, 50);
  }

  #[test]
  fn test_parse_rejects_wrong_types() {
    assert!(Config::parse("api:\n  limit: lots\n").is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let result = Config::load(Some(Path::new("/definitely/not/here/jobdeck.yaml")));
    assert!(result.is_err());
  }
}
