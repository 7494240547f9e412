//! # Field and Identity Resolution
//!
//! Turns the human-readable names found in spreadsheets (field display
//! names, priority and issue-type names, user emails) into the identifiers
//! the Jira API expects. Every lookup table is fetched fresh per run.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tally_jira::JiraClient;
use tracing::{debug, info, warn};

/// Mapping of field display name to field id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCatalog {
  by_name: HashMap<String, String>,
}

/// Outcome of looking up a column header in the [`FieldCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
  /// The header is the display name of a known field
  Known(&'a str),
  /// No field has this display name; the header is passed through as-is
  Unresolved(&'a str),
}

impl<'a> FieldRef<'a> {
  /// The id to use in the issue payload
  pub const fn id(self) -> &'a str {
    match self {
      FieldRef::Known(id) | FieldRef::Unresolved(id) => id,
    }
  }
}

impl FieldCatalog {
  /// Build a catalog from (display name, id) pairs. Later duplicates win.
  pub fn from_pairs<I, N, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (N, V)>,
    N: Into<String>,
    V: Into<String>,
  {
    Self {
      by_name: pairs.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
    }
  }

  /// Look up a column header
  pub fn resolve<'a>(&'a self, header: &'a str) -> FieldRef<'a> {
    match self.by_name.get(header) {
      Some(id) => FieldRef::Known(id),
      None => FieldRef::Unresolved(header),
    }
  }

  pub fn len(&self) -> usize {
    self.by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_name.is_empty()
  }
}

/// Priority and issue-type name to id tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumerations {
  pub priorities: HashMap<String, String>,
  pub issue_types: HashMap<String, String>,
}

impl Enumerations {
  pub fn priority_id(&self, name: &str) -> Option<&str> {
    self.priorities.get(name).map(String::as_str)
  }

  pub fn issue_type_id(&self, name: &str) -> Option<&str> {
    self.issue_types.get(name).map(String::as_str)
  }
}

/// Fetch the display name to id mapping of every field, standard and custom
pub async fn resolve_field_catalog(client: &JiraClient) -> Result<FieldCatalog> {
  let fields = client.list_fields().await.context("Failed to resolve field catalog")?;
  let catalog = FieldCatalog::from_pairs(fields.into_iter().map(|field| (field.name, field.id)));
  debug!("Resolved {} field name(s)", catalog.len());
  Ok(catalog)
}

/// Fetch the priority and issue-type tables
pub async fn resolve_enumerations(client: &JiraClient) -> Result<Enumerations> {
  let priorities = client
    .list_priorities()
    .await
    .context("Failed to resolve priorities")?
    .into_iter()
    .map(|p| (p.name, p.id))
    .collect();
  let issue_types = client
    .list_issue_types()
    .await
    .context("Failed to resolve issue types")?
    .into_iter()
    .map(|t| (t.name, t.id))
    .collect();

  Ok(Enumerations {
    priorities,
    issue_types,
  })
}

/// Fetch the non-custom field names for each project key, in Jira's order
/// and without duplicates.
///
/// Jira's field listing is instance-wide, so every key receives the same set.
pub async fn resolve_standard_fields(client: &JiraClient, project_keys: &[&str]) -> Result<Vec<(String, Vec<String>)>> {
  let mut out = Vec::with_capacity(project_keys.len());
  for key in project_keys {
    out.push((key.to_string(), standard_fields(client).await?));
  }
  Ok(out)
}

/// Fetch the non-custom field names, in Jira's order and without duplicates
pub async fn standard_fields(client: &JiraClient) -> Result<Vec<String>> {
  let fields = client.list_fields().await.context("Failed to fetch fields")?;

  let mut names: Vec<String> = Vec::new();
  for field in fields.into_iter().filter(|f| !f.custom) {
    if names.iter().any(|n| n.eq_ignore_ascii_case(&field.name)) {
      debug!("Skipping duplicate field name '{}' ({})", field.name, field.id);
      continue;
    }
    names.push(field.name);
  }
  Ok(names)
}

/// Map an email address to a Jira account id.
///
/// Uses the first user in the order Jira returns them; if that user carries
/// no account id the lookup yields `None`. Zero matches and
/// remote failures both yield `None` after logging, so one bad address never
/// aborts an import.
pub async fn resolve_account_id(client: &JiraClient, email: &str) -> Option<String> {
  match client.search_users(email).await {
    Ok(users) => match users.into_iter().next().and_then(|user| user.account_id) {
      Some(account_id) => {
        info!("Resolved {email} to account {account_id}");
        Some(account_id)
      }
      None => {
        warn!("No user found for email: {email}");
        None
      }
    },
    Err(e) => {
      warn!("Failed to fetch account id for email {email}: {e:#}");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use tally_test_utils::MockJira;

  use super::*;

  #[test]
  fn test_field_ref_fallback() {
    let catalog = FieldCatalog::from_pairs([("Summary", "summary"), ("Story Points", "customfield_10016")]);

    assert_eq!(catalog.resolve("Story Points"), FieldRef::Known("customfield_10016"));
    assert_eq!(catalog.resolve("labels"), FieldRef::Unresolved("labels"));
    assert_eq!(catalog.resolve("labels").id(), "labels");
    assert_eq!(catalog.resolve("Summary").id(), "summary");
  }

  #[tokio::test]
  async fn test_resolve_field_catalog_is_idempotent() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    let client = jira.client()?;

    let first = resolve_field_catalog(&client).await?;
    let second = resolve_field_catalog(&client).await?;

    assert_eq!(first, second);
    assert_eq!(first.resolve("Priority"), FieldRef::Known("priority"));
    assert_eq!(first.resolve("Story Points"), FieldRef::Known("customfield_10016"));

    Ok(())
  }

  #[tokio::test]
  async fn test_resolve_enumerations() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    let client = jira.client()?;

    let enums = resolve_enumerations(&client).await?;
    assert_eq!(enums.priority_id("High"), Some("2"));
    assert_eq!(enums.issue_type_id("Bug"), Some("10001"));
    assert_eq!(enums.priority_id("Urgent"), None);

    Ok(())
  }

  #[tokio::test]
  async fn test_resolve_standard_fields_filters_custom() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    let client = jira.client()?;

    let per_key = resolve_standard_fields(&client, &["ABC", "XYZ"]).await?;
    assert_eq!(per_key.len(), 2);
    assert_eq!(per_key[0].0, "ABC");
    assert_eq!(per_key[0].1, per_key[1].1);
    assert!(per_key[0].1.contains(&"Summary".to_string()));
    assert!(!per_key[0].1.contains(&"Story Points".to_string()));

    Ok(())
  }

  #[tokio::test]
  async fn test_resolve_account_id() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_user("x@example.com", Some("acc-x")).await;
    jira.mount_user("nobody@example.com", None).await;
    let client = jira.client()?;

    assert_eq!(
      resolve_account_id(&client, "x@example.com").await,
      Some("acc-x".to_string())
    );
    assert_eq!(resolve_account_id(&client, "nobody@example.com").await, None);

    Ok(())
  }

  #[tokio::test]
  async fn test_resolve_account_id_uses_first_match_only() -> Result<()> {
    let jira = MockJira::start().await;
    jira
      .mount_get(
        "user/search",
        json!([
            { "displayName": "Hidden Account" },
            { "accountId": "acc-second", "emailAddress": "x@example.com" }
        ]),
      )
      .await;
    let client = jira.client()?;

    assert_eq!(resolve_account_id(&client, "x@example.com").await, None);

    Ok(())
  }

  #[tokio::test]
  async fn test_resolve_account_id_swallows_remote_failure() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_failing_user_search(500).await;
    let client = jira.client()?;

    assert_eq!(resolve_account_id(&client, "x@example.com").await, None);

    Ok(())
  }
}
