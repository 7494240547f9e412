//! # Template Generation
//!
//! Builds one blank import spreadsheet per project key. Columns are the
//! instance's standard fields with the primary fields first; primary fields
//! with a known value source get a dropdown.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_jira::JiraClient;
use tracing::{debug, info};

use crate::import::{ASSIGNEE_COLUMN, ISSUE_TYPE_COLUMN, PRIORITY_COLUMN, REPORTER_COLUMN};
use crate::output::{format_path, format_project_key, print_error, print_success};
use crate::resolve::{resolve_enumerations, resolve_standard_fields};
use crate::spreadsheet::{TemplateColumn, write_template};

/// Fields placed first in every template, in this order
pub const PRIMARY_FIELDS: [&str; 6] = [
  "Summary",
  "Description",
  PRIORITY_COLUMN,
  ASSIGNEE_COLUMN,
  REPORTER_COLUMN,
  ISSUE_TYPE_COLUMN,
];

/// A project key whose template could not be written
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFailure {
  pub project_key: String,
  pub error: String,
}

/// Outcome of a template run
#[derive(Debug, Default)]
pub struct TemplateReport {
  /// Files written, in key order
  pub written: Vec<PathBuf>,
  pub failed: Vec<KeyFailure>,
}

impl TemplateReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty()
  }
}

/// File name of the template for `project_key`
pub fn template_file_name(project_key: &str) -> String {
  format!("report_spreadsheet_{project_key}.xlsx")
}

/// Put the primary fields that are present first, then the rest in their
/// original order
pub fn order_fields(available: &[String]) -> Vec<String> {
  let mut ordered: Vec<String> = PRIMARY_FIELDS
    .iter()
    .filter(|primary| available.iter().any(|name| name == *primary))
    .map(|primary| primary.to_string())
    .collect();
  ordered.extend(
    available
      .iter()
      .filter(|name| !PRIMARY_FIELDS.contains(&name.as_str()))
      .cloned(),
  );
  ordered
}

/// Write a template for each of `project_keys` into `output_dir`.
///
/// Keys are processed independently: a failing key is reported and the
/// remaining keys still run.
pub async fn generate_template(
  client: &JiraClient,
  project_keys: &[&str],
  output_dir: &Path,
) -> Result<TemplateReport> {
  fs::create_dir_all(output_dir)
    .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

  let mut report = TemplateReport::default();
  for key in project_keys {
    match generate_for_key(client, key, output_dir).await {
      Ok(path) => {
        print_success(&format!(
          "Wrote template for {} to {}",
          format_project_key(key),
          format_path(&path)
        ));
        report.written.push(path);
      }
      Err(e) => {
        print_error(&format!("Failed to generate template for {key}: {e:#}"));
        report.failed.push(KeyFailure {
          project_key: key.to_string(),
          error: format!("{e:#}"),
        });
      }
    }
  }

  Ok(report)
}

async fn generate_for_key(client: &JiraClient, project_key: &str, output_dir: &Path) -> Result<PathBuf> {
  let columns = template_columns(client, project_key).await?;
  let path = output_dir.join(template_file_name(project_key));
  write_template(&path, &columns)?;
  info!("Template for {project_key} has {} column(s)", columns.len());
  Ok(path)
}

/// Resolve the ordered columns and dropdown values for `project_key`
pub(crate) async fn template_columns(client: &JiraClient, project_key: &str) -> Result<Vec<TemplateColumn>> {
  let available = resolve_standard_fields(client, &[project_key])
    .await?
    .into_iter()
    .next()
    .map(|(_, names)| names)
    .unwrap_or_default();
  anyhow::ensure!(
    !available.is_empty(),
    "Jira returned no standard fields for project {project_key}"
  );

  let fields = order_fields(&available);
  let has = |name: &str| fields.iter().any(|field| field == name);

  let (priorities, issue_types) = if has(PRIORITY_COLUMN) || has(ISSUE_TYPE_COLUMN) {
    let enums = resolve_enumerations(client).await?;
    (sorted(enums.priorities.into_keys()), sorted(enums.issue_types.into_keys()))
  } else {
    (Vec::new(), Vec::new())
  };

  let emails = if has(ASSIGNEE_COLUMN) || has(REPORTER_COLUMN) {
    assignable_emails(client, project_key).await?
  } else {
    Vec::new()
  };

  let columns = fields
    .into_iter()
    .map(|name| {
      let choices = match name.as_str() {
        PRIORITY_COLUMN => Some(priorities.clone()),
        ISSUE_TYPE_COLUMN => Some(issue_types.clone()),
        ASSIGNEE_COLUMN | REPORTER_COLUMN => Some(emails.clone()),
        _ => None,
      };
      match choices {
        Some(choices) => TemplateColumn::dropdown(name, choices),
        None => TemplateColumn::plain(name),
      }
    })
    .collect();

  Ok(columns)
}

async fn assignable_emails(client: &JiraClient, project_key: &str) -> Result<Vec<String>> {
  let users = client
    .search_assignable_users_for_projects("", &[project_key])
    .await
    .with_context(|| format!("Failed to fetch assignable users for {project_key}"))?;

  let total = users.len();
  let emails = sorted(users.into_iter().filter_map(|user| user.email_address));
  if emails.len() < total {
    debug!(
      "{} assignable user(s) in {project_key} have no visible email or share one",
      total - emails.len()
    );
  }
  Ok(emails)
}

fn sorted(values: impl IntoIterator<Item = String>) -> Vec<String> {
  values
    .into_iter()
    .filter(|value| !value.trim().is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
  use calamine::{Reader, open_workbook_auto};
  use serde_json::json;
  use tally_test_utils::{MockJira, WorkspaceGuard};

  use super::*;
  use crate::spreadsheet::ISSUES_SHEET;

  fn names(columns: &[TemplateColumn]) -> Vec<&str> {
    columns.iter().map(|column| column.name.as_str()).collect()
  }

  #[test]
  fn test_template_file_name() {
    assert_eq!(template_file_name("ABC"), "report_spreadsheet_ABC.xlsx");
  }

  #[test]
  fn test_order_fields() {
    let available: Vec<String> = ["Labels", "Priority", "Due date", "Summary"]
      .iter()
      .map(|s| s.to_string())
      .collect();

    assert_eq!(order_fields(&available), vec!["Summary", "Priority", "Labels", "Due date"]);
  }

  #[tokio::test]
  async fn test_template_columns_for_project() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira
      .mount_assignable_users("ABC", &["b@example.com", "a@example.com", "b@example.com"])
      .await;
    let client = jira.client()?;

    let columns = template_columns(&client, "ABC").await?;

    assert_eq!(
      names(&columns),
      vec![
        "Summary",
        "Description",
        "Priority",
        "Assignee",
        "Reporter",
        "Issue Type",
        "Labels",
        "Due date"
      ]
    );
    assert_eq!(columns[0].choices, None);
    assert_eq!(columns[1].choices, None);
    assert_eq!(
      columns[2].choices,
      Some(vec!["High".into(), "Highest".into(), "Low".into(), "Medium".into()])
    );
    assert_eq!(
      columns[3].choices,
      Some(vec!["a@example.com".into(), "b@example.com".into()])
    );
    assert_eq!(columns[3].choices, columns[4].choices);
    assert_eq!(
      columns[5].choices,
      Some(vec!["Bug".into(), "Story".into(), "Task".into()])
    );
    assert_eq!(columns[6].choices, None);

    Ok(())
  }

  #[tokio::test]
  async fn test_duplicate_priority_names_collapse() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_fields(json!([{ "id": "priority", "name": "Priority", "custom": false }])).await;
    jira
      .mount_priorities(json!([
          { "id": "1", "name": "High" },
          { "id": "5", "name": "High" },
          { "id": "2", "name": "Low" }
      ]))
      .await;
    jira.mount_get("issuetype", json!([])).await;
    let client = jira.client()?;

    let columns = template_columns(&client, "ABC").await?;
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].choices, Some(vec!["High".into(), "Low".into()]));

    Ok(())
  }

  #[tokio::test]
  async fn test_no_standard_fields_is_an_error() -> Result<()> {
    let jira = MockJira::start().await;
    jira
      .mount_fields(json!([{ "id": "customfield_1", "name": "Team", "custom": true }]))
      .await;
    let client = jira.client()?;

    let err = template_columns(&client, "ABC").await.unwrap_err();
    assert!(err.to_string().contains("no standard fields"));

    Ok(())
  }

  #[tokio::test]
  async fn test_generate_template_for_two_projects() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira.mount_assignable_users("PROJ1", &["a@example.com"]).await;
    jira.mount_assignable_users("PROJ2", &["b@example.com"]).await;
    let client = jira.client()?;
    let workspace = WorkspaceGuard::new();
    let out = workspace.file("out");

    let report = generate_template(&client, &["PROJ1", "PROJ2"], &out).await?;

    assert!(report.is_success());
    assert_eq!(
      report.written,
      vec![
        out.join("report_spreadsheet_PROJ1.xlsx"),
        out.join("report_spreadsheet_PROJ2.xlsx")
      ]
    );

    for path in &report.written {
      let mut workbook = open_workbook_auto(path)?;
      assert_eq!(workbook.sheet_names()[0], ISSUES_SHEET);
      let range = workbook.worksheet_range(ISSUES_SHEET)?;
      let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
      assert_eq!(&header[..3], &["Summary", "Description", "Priority"]);
    }

    Ok(())
  }

  #[tokio::test]
  async fn test_failing_key_does_not_stop_others() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira.mount_assignable_users("GOOD", &["a@example.com"]).await;
    let client = jira.client()?;
    let workspace = WorkspaceGuard::new();

    let report = generate_template(&client, &["BAD", "GOOD"], workspace.path()).await?;

    assert_eq!(report.written, vec![workspace.file("report_spreadsheet_GOOD.xlsx")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].project_key, "BAD");
    assert!(report.failed[0].error.contains("assignable users"));
    assert!(!workspace.file("report_spreadsheet_BAD.xlsx").exists());
    assert!(!report.is_success());

    Ok(())
  }
}
