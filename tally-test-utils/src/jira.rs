//! Mock Jira server for testing
//!
//! Wraps a [`wiremock::MockServer`] and mounts the REST resources tally
//! talks to, with a small canned instance: a handful of standard fields and
//! one custom field, four priorities, three issue types and two projects.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use tally_jira::{JiraClient, create_jira_client};
use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const API: &str = "/rest/api/2";

/// A running mock Jira instance
pub struct MockJira {
  server: MockServer,
}

impl MockJira {
  /// Username the mocks expect in the basic auth header
  pub const USERNAME: &'static str = "test_user";
  /// API token the mocks expect in the basic auth header
  pub const API_TOKEN: &'static str = "test_token";

  /// Start a mock server with nothing mounted
  pub async fn start() -> Self {
    Self {
      server: MockServer::start().await,
    }
  }

  /// Base URL of the mock server
  pub fn uri(&self) -> String {
    self.server.uri()
  }

  /// Access the underlying wiremock server
  pub fn server(&self) -> &MockServer {
    &self.server
  }

  /// A client authenticated with the expected test credentials
  pub fn client(&self) -> anyhow::Result<JiraClient> {
    create_jira_client(&self.uri(), Self::USERNAME, Self::API_TOKEN)
  }

  /// Respond to an authenticated GET of `resource` with `body`
  pub async fn mount_get(&self, resource: &str, body: Value) {
    Mock::given(method("GET"))
      .and(path(format!("{API}/{resource}")))
      .and(basic_auth(Self::USERNAME, Self::API_TOKEN))
      .respond_with(ResponseTemplate::new(200).set_body_json(body))
      .mount(&self.server)
      .await;
  }

  /// Mount fields, priorities, issue types, projects and the session user
  pub async fn mount_default_metadata(&self) {
    self.mount_fields(default_fields()).await;
    self.mount_priorities(default_priorities()).await;
    self.mount_get("issuetype", default_issue_types()).await;
    self
      .mount_get(
        "project",
        json!([
            { "id": "10000", "key": "PROJ", "name": "Project" },
            { "id": "10001", "key": "ABC", "name": "Alphabet" }
        ]),
      )
      .await;
    self
      .mount_get(
        "myself",
        json!({ "accountId": "acc-me", "displayName": "Test User", "emailAddress": "test@example.com" }),
      )
      .await;
  }

  pub async fn mount_fields(&self, fields: Value) {
    self.mount_get("field", fields).await;
  }

  pub async fn mount_priorities(&self, priorities: Value) {
    self.mount_get("priority", priorities).await;
  }

  /// Answer a user search for `email` with one user, or none
  pub async fn mount_user(&self, email: &str, account_id: Option<&str>) {
    let body = match account_id {
      Some(id) => json!([{ "accountId": id, "emailAddress": email, "displayName": email }]),
      None => json!([]),
    };
    Mock::given(method("GET"))
      .and(path(format!("{API}/user/search")))
      .and(query_param("query", email))
      .respond_with(ResponseTemplate::new(200).set_body_json(body))
      .mount(&self.server)
      .await;
  }

  /// Make every user search fail with `status`
  pub async fn mount_failing_user_search(&self, status: u16) {
    Mock::given(method("GET"))
      .and(path(format!("{API}/user/search")))
      .respond_with(ResponseTemplate::new(status))
      .mount(&self.server)
      .await;
  }

  /// Answer the assignable-user search for `project_key` with `emails`
  pub async fn mount_assignable_users(&self, project_key: &str, emails: &[&str]) {
    let users: Vec<Value> = emails
      .iter()
      .enumerate()
      .map(|(i, email)| json!({ "accountId": format!("acc-{i}"), "emailAddress": email }))
      .collect();
    Mock::given(method("GET"))
      .and(path(format!("{API}/user/assignable/multiProjectSearch")))
      .and(query_param("projectKeys", project_key))
      .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(users)))
      .mount(&self.server)
      .await;
  }

  /// Accept issue creation, answering with `<project_key>-1`, `-2`, ...
  pub async fn mount_create_issue(&self, project_key: &str) {
    let counter = Arc::new(AtomicUsize::new(0));
    let project_key = project_key.to_string();
    Mock::given(method("POST"))
      .and(path(format!("{API}/issue")))
      .and(basic_auth(Self::USERNAME, Self::API_TOKEN))
      .respond_with(move |_: &Request| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(201).set_body_json(json!({
            "id": format!("{}", 10000 + n),
            "key": format!("{project_key}-{n}"),
        }))
      })
      .mount(&self.server)
      .await;
  }

  /// Reject issue creation for payloads whose summary is `summary`
  pub async fn mount_create_issue_failure(&self, summary: &str) {
    Mock::given(method("POST"))
      .and(path(format!("{API}/issue")))
      .and(body_partial_json(json!({ "fields": { "summary": summary } })))
      .respond_with(ResponseTemplate::new(400).set_body_json(json!({
          "errorMessages": [],
          "errors": { "summary": "Summary is not allowed here" }
      })))
      .with_priority(1)
      .mount(&self.server)
      .await;
  }

  /// The `fields` objects of every issue creation request received so far
  pub async fn created_issue_fields(&self) -> Vec<Value> {
    self
      .requests_to("issue")
      .await
      .into_iter()
      .filter(|request| request.method.as_str() == "POST")
      .filter_map(|request| request.body_json::<Value>().ok())
      .filter_map(|body| body.get("fields").cloned())
      .collect()
  }

  /// Number of requests received for `resource`
  pub async fn request_count(&self, resource: &str) -> usize {
    self.requests_to(resource).await.len()
  }

  async fn requests_to(&self, resource: &str) -> Vec<Request> {
    let wanted = format!("{API}/{resource}");
    self
      .server
      .received_requests()
      .await
      .unwrap_or_default()
      .into_iter()
      .filter(|request| request.url.path() == wanted)
      .collect()
  }
}

/// Fields of the canned instance; `Story Points` is the only custom one
pub fn default_fields() -> Value {
  json!([
      { "id": "issuetype", "name": "Issue Type", "custom": false },
      { "id": "summary", "name": "Summary", "custom": false },
      { "id": "labels", "name": "Labels", "custom": false },
      { "id": "reporter", "name": "Reporter", "custom": false },
      { "id": "priority", "name": "Priority", "custom": false },
      { "id": "customfield_10016", "name": "Story Points", "custom": true },
      { "id": "description", "name": "Description", "custom": false },
      { "id": "duedate", "name": "Due date", "custom": false },
      { "id": "assignee", "name": "Assignee", "custom": false }
  ])
}

/// Priorities of the canned instance
pub fn default_priorities() -> Value {
  json!([
      { "id": "1", "name": "Highest" },
      { "id": "2", "name": "High" },
      { "id": "3", "name": "Medium" },
      { "id": "4", "name": "Low" }
  ])
}

/// Issue types of the canned instance
pub fn default_issue_types() -> Value {
  json!([
      { "id": "10001", "name": "Bug" },
      { "id": "10002", "name": "Task" },
      { "id": "10003", "name": "Story" }
  ])
}
