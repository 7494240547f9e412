//! # Jira Issue Endpoints
//!
//! Issue creation. The payload is an already-resolved `fields` map keyed by
//! Jira field id.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{JiraClient, status_error};
use crate::models::{CreateIssueRequest, CreatedIssue, JiraErrorResponse};

impl JiraClient {
  /// Create an issue from a map of field id to value
  pub async fn create_issue(&self, fields: &Map<String, Value>) -> Result<CreatedIssue> {
    let url = self.api_url("issue");
    let payload = CreateIssueRequest { fields };
    debug!("POST {url} with {} field(s)", fields.len());

    let response = self
      .client
      .post(&url)
      .basic_auth(&self.auth.username, Some(&self.auth.api_token))
      .json(&payload)
      .send()
      .await
      .context("Failed to create Jira issue")?;

    match response.status() {
      StatusCode::CREATED | StatusCode::OK => response
        .json::<CreatedIssue>()
        .await
        .context("Failed to parse created Jira issue"),
      StatusCode::BAD_REQUEST => {
        let body = response.json::<JiraErrorResponse>().await.unwrap_or_default();
        Err(anyhow::anyhow!("Jira rejected the issue: {}", body.summary()))
      }
      status => Err(status_error(status, response, "project").await),
    }
  }
}
