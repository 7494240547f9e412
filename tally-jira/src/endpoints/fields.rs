//! # Jira Field Endpoints

use anyhow::Result;

use crate::client::JiraClient;
use crate::models::JiraField;

impl JiraClient {
  /// List every field known to the instance, system and custom alike.
  ///
  /// `/field` is not scoped to a project.
  pub async fn list_fields(&self) -> Result<Vec<JiraField>> {
    self.get_json("field", &[], "fields").await
  }
}
