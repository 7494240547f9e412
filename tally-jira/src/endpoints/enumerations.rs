//! # Jira Enumeration Endpoints
//!
//! Priorities and issue types, the two instance-wide value lists tally maps
//! spreadsheet names onto.

use anyhow::Result;

use crate::client::JiraClient;
use crate::models::{JiraIssueType, JiraPriority};

impl JiraClient {
  /// List all priorities
  pub async fn list_priorities(&self) -> Result<Vec<JiraPriority>> {
    self.get_json("priority", &[], "priorities").await
  }

  /// List all issue types visible to the user
  pub async fn list_issue_types(&self) -> Result<Vec<JiraIssueType>> {
    self.get_json("issuetype", &[], "issue types").await
  }
}
