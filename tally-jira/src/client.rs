use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::consts::{API_PREFIX, USER_AGENT};
use crate::models::JiraAuth;

/// Represents a Jira API client
///
/// The client holds the credentials for the whole run and attaches them to
/// every request; it never checks them up front.
pub struct JiraClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) auth: JiraAuth,
}

impl JiraClient {
  /// Create a new Jira client
  pub fn new(base_url: &str, auth: JiraAuth) -> Result<Self> {
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      auth,
    })
  }

  /// The server URL this client talks to, without a trailing slash
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Build the absolute URL of a REST resource
  pub(crate) fn api_url(&self, resource: &str) -> String {
    format!("{}/{}/{}", self.base_url, API_PREFIX, resource)
  }

  /// GET a REST resource and decode the JSON body.
  ///
  /// `what` names the resource in error messages ("fields", "priorities").
  pub(crate) async fn get_json<T: DeserializeOwned>(
    &self,
    resource: &str,
    query: &[(&str, &str)],
    what: &str,
  ) -> Result<T> {
    let url = self.api_url(resource);
    debug!("GET {url}");

    let response = self
      .client
      .get(&url)
      .basic_auth(&self.auth.username, Some(&self.auth.api_token))
      .query(query)
      .send()
      .await
      .with_context(|| format!("Failed to fetch Jira {what}"))?;

    trace!("GET {url} -> {}", response.status());

    match response.status() {
      StatusCode::OK => response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse Jira {what}")),
      status => Err(status_error(status, response, what).await),
    }
  }
}

/// Map a non-success response onto the error messages used across endpoints
pub(crate) async fn status_error(status: StatusCode, response: Response, what: &str) -> anyhow::Error {
  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
      anyhow!("Authentication failed. Please check your Jira credentials.")
    }
    StatusCode::NOT_FOUND => anyhow!("Jira {what} not found"),
    _ => anyhow!(
      "Unexpected error: HTTP {} - {}",
      status,
      response.text().await.unwrap_or_default()
    ),
  }
}

/// Create a Jira client from credentials
pub fn create_jira_client(base_url: &str, username: &str, api_token: &str) -> Result<JiraClient> {
  let auth = JiraAuth {
    username: username.to_string(),
    api_token: api_token.to_string(),
  };

  JiraClient::new(base_url, auth)
}
