//! # Configuration
//!
//! Loads the Jira server URL and basic-auth credentials from a JSON file:
//!
//! ```json
//! {
//!   "jira_server_url": "https://company.atlassian.net",
//!   "basic_auth": { "username": "me@company.com", "api_token": "..." }
//! }
//! ```
//!
//! The file is read once per run; its values are passed explicitly to the
//! client factory and never written back or logged.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the config file path
pub const ENV_CONFIG_PATH: &str = "TALLY_CONFIG";

/// Errors that can occur while loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Config file not found: {0}")]
  NotFound(PathBuf),
  #[error("Failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Config file {path} is invalid: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error("Config file {path} has an empty '{key}'")]
  EmptyValue { path: PathBuf, key: &'static str },
  #[error("Invalid jira_server_url '{url}': {reason}")]
  InvalidServerUrl { url: String, reason: String },
}

/// Parsed contents of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub jira_server_url: String,
  pub basic_auth: BasicAuth,
}

/// Basic-auth credentials for the Jira REST API
#[derive(Clone, Deserialize)]
pub struct BasicAuth {
  pub username: String,
  pub api_token: String,
}

impl fmt::Debug for BasicAuth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BasicAuth")
      .field("username", &self.username)
      .field("api_token", &"<redacted>")
      .finish()
  }
}

/// Load and validate the config file at `path`.
///
/// The server URL is normalized: `https://` is assumed when no scheme is
/// given and a trailing slash is removed.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
  let contents = std::fs::read_to_string(path).map_err(|source| {
    if source.kind() == std::io::ErrorKind::NotFound {
      ConfigError::NotFound(path.to_path_buf())
    } else {
      ConfigError::Read {
        path: path.to_path_buf(),
        source,
      }
    }
  })?;

  let mut config: Config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  let empty = |key| ConfigError::EmptyValue {
    path: path.to_path_buf(),
    key,
  };
  if config.basic_auth.username.trim().is_empty() {
    return Err(empty("basic_auth.username"));
  }
  if config.basic_auth.api_token.trim().is_empty() {
    return Err(empty("basic_auth.api_token"));
  }

  config.jira_server_url = normalize_server_url(&config.jira_server_url)?;
  debug!("Loaded config from {} for {}", path.display(), config.jira_server_url);

  Ok(config)
}

/// Validate and normalize a Jira server URL
pub fn normalize_server_url(url: &str) -> Result<String, ConfigError> {
  let trimmed = url.trim();
  let invalid = |reason: &str| ConfigError::InvalidServerUrl {
    url: url.to_string(),
    reason: reason.to_string(),
  };

  if trimmed.is_empty() {
    return Err(invalid("URL cannot be empty"));
  }

  let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
    trimmed.to_string()
  } else {
    format!("https://{trimmed}")
  };

  let parsed = url::Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;
  if parsed.host_str().is_none() {
    return Err(invalid("URL must have a host"));
  }

  Ok(parsed.as_str().trim_end_matches('/').to_string())
}
