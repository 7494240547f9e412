use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents Jira authentication credentials
#[derive(Clone)]
pub struct JiraAuth {
  pub username: String,
  pub api_token: String,
}

/// Represents a Jira user as returned by `/myself` and the user searches.
///
/// Cloud instances hide email addresses of users with restrictive profile
/// visibility, and Server instances have no account ids, so both are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
  pub account_id: Option<String>,
  pub display_name: Option<String>,
  pub email_address: Option<String>,
}

impl fmt::Display for JiraUser {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = self
      .display_name
      .as_deref()
      .or(self.email_address.as_deref())
      .or(self.account_id.as_deref())
      .unwrap_or("<unknown user>");
    match &self.email_address {
      Some(email) if Some(email.as_str()) != self.display_name.as_deref() => write!(f, "{name} <{email}>"),
      _ => write!(f, "{name}"),
    }
  }
}

/// Represents a Jira project
#[derive(Debug, Clone, Deserialize)]
pub struct JiraProject {
  pub id: String,
  pub key: String,
  pub name: String,
}

/// Represents a Jira field definition from `/field`
#[derive(Debug, Clone, Deserialize)]
pub struct JiraField {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub custom: bool,
}

/// Represents a Jira priority
#[derive(Debug, Clone, Deserialize)]
pub struct JiraPriority {
  pub id: String,
  pub name: String,
}

/// Represents a Jira issue type
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueType {
  pub id: String,
  pub name: String,
}

/// Represents an issue creation request payload
#[derive(Debug, Serialize)]
pub struct CreateIssueRequest<'a> {
  pub fields: &'a Map<String, Value>,
}

/// Represents the response to a successful issue creation
#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
  pub id: String,
  pub key: String,
}

/// Represents the error body Jira sends with 4xx responses
#[derive(Debug, Default, Deserialize)]
pub struct JiraErrorResponse {
  #[serde(default, rename = "errorMessages")]
  pub error_messages: Vec<String>,
  #[serde(default)]
  pub errors: BTreeMap<String, String>,
}

impl JiraErrorResponse {
  /// Flatten the error body into a single line
  pub fn summary(&self) -> String {
    let mut parts = self.error_messages.clone();
    parts.extend(self.errors.iter().map(|(field, message)| format!("{field}: {message}")));

    if parts.is_empty() {
      "no error details returned".to_string()
    } else {
      parts.join("; ")
    }
  }
}
