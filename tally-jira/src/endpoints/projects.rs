//! # Jira Project Endpoints

use anyhow::Result;

use crate::client::JiraClient;
use crate::models::JiraProject;

impl JiraClient {
  /// List the projects visible to the authenticated user
  pub async fn list_projects(&self) -> Result<Vec<JiraProject>> {
    self.get_json("project", &[], "projects").await
  }
}
