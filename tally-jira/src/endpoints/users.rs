//! # Jira User Endpoints
//!
//! The session user, free-text user search, and assignable-user search.

use anyhow::Result;

use crate::client::JiraClient;
use crate::models::JiraUser;

impl JiraClient {
  /// Fetch the user the credentials belong to
  pub async fn current_user(&self) -> Result<JiraUser> {
    self.get_json("myself", &[], "user").await
  }

  /// Search users by a free-text query (display name or email)
  pub async fn search_users(&self, query: &str) -> Result<Vec<JiraUser>> {
    self.get_json("user/search", &[("query", query)], "users").await
  }

  /// Search users that can be assigned issues in all of the given projects
  pub async fn search_assignable_users_for_projects(
    &self,
    query: &str,
    project_keys: &[&str],
  ) -> Result<Vec<JiraUser>> {
    let keys = project_keys.join(",");
    self
      .get_json(
        "user/assignable/multiProjectSearch",
        &[("query", query), ("projectKeys", keys.as_str())],
        "assignable users",
      )
      .await
  }
}
