//! # Issue Import
//!
//! Creates one Jira issue per spreadsheet row. Field metadata is resolved once
//! per batch; each row is then turned into a `fields` payload and submitted
//! on its own, so a failing row never stops the rows after it.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use tally_jira::JiraClient;
use tracing::{debug, info, warn};

use crate::output::{format_issue_key, format_project_key, print_error, print_info, print_success, print_warning};
use crate::resolve::{Enumerations, FieldCatalog, FieldRef, resolve_account_id, resolve_enumerations, resolve_field_catalog};
use crate::spreadsheet::SheetRow;

pub const PRIORITY_COLUMN: &str = "Priority";
pub const ISSUE_TYPE_COLUMN: &str = "Issue Type";
pub const REPORTER_COLUMN: &str = "Reporter";
pub const ASSIGNEE_COLUMN: &str = "Assignee";

/// Options for an import run
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
  /// Build and print payloads without creating issues
  pub dry_run: bool,
}

/// A row whose issue could not be created
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
  /// Spreadsheet row number (1-based, header is row 1)
  pub row: usize,
  pub error: String,
}

/// Outcome of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
  /// Keys of the created issues, in row order
  pub created: Vec<String>,
  pub failed: Vec<RowFailure>,
  /// Payloads built in dry-run mode, in row order
  pub previewed: Vec<Map<String, Value>>,
}

impl ImportReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty()
  }
}

/// Derive the project key from an input file name.
///
/// The key is the last `_`-separated token of the file name, cut at its first
/// `.`, so `tickets_PROJ.xlsx` and `tickets_PROJ.v2.xlsx` both target `PROJ`.
/// A name without underscores is used whole.
pub fn project_key_from_path(path: &Path) -> Result<String> {
  let name = path
    .file_name()
    .and_then(|name| name.to_str())
    .with_context(|| format!("Cannot derive a project key from {}", path.display()))?;

  let token = name.rsplit('_').next().unwrap_or(name);
  let key = token.split('.').next().unwrap_or(token).trim();
  anyhow::ensure!(
    !key.is_empty(),
    "Cannot derive a project key from {}: the name must end in _<PROJECT>",
    path.display()
  );

  Ok(key.to_string())
}

/// Create an issue for every row in `rows` in project `project_key`
pub async fn import_issues(
  client: &JiraClient,
  rows: &[SheetRow],
  project_key: &str,
  options: ImportOptions,
) -> Result<ImportReport> {
  let catalog = resolve_field_catalog(client).await?;
  let enums = resolve_enumerations(client).await?;
  info!(
    "Importing {} row(s) into {project_key} ({} fields, {} priorities, {} issue types known)",
    rows.len(),
    catalog.len(),
    enums.priorities.len(),
    enums.issue_types.len()
  );

  let mut report = ImportReport::default();
  for row in rows {
    let payload = build_payload(client, row, project_key, &catalog, &enums).await;

    if options.dry_run {
      let rendered = serde_json::to_string_pretty(&payload).unwrap_or_default();
      print_info(&format!("Row {} would create:\n{rendered}", row.number));
      report.previewed.push(payload);
      continue;
    }

    match client.create_issue(&payload).await {
      Ok(created) => {
        print_success(&format!(
          "Successfully created issue {} for project {}.",
          format_issue_key(&created.key),
          format_project_key(project_key)
        ));
        report.created.push(created.key);
      }
      Err(e) => {
        print_error(&format!("Failed to create issue from row {}: {e:#}", row.number));
        report.failed.push(RowFailure {
          row: row.number,
          error: format!("{e:#}"),
        });
      }
    }
  }

  Ok(report)
}

/// Build the `fields` payload for one row.
///
/// Blank cells are skipped. Priority and issue-type names that match a Jira
/// name exactly (case and whitespace included) become `{id}` references,
/// reporter and assignee emails become `{accountId}` references, and every
/// other column is sent as-is under its resolved field id.
pub async fn build_payload(
  client: &JiraClient,
  row: &SheetRow,
  project_key: &str,
  catalog: &FieldCatalog,
  enums: &Enumerations,
) -> Map<String, Value> {
  let mut fields = Map::new();
  fields.insert("project".to_string(), json!({ "key": project_key }));

  for (column, value) in row.values() {
    let field = catalog.resolve(column);
    if let FieldRef::Unresolved(header) = field {
      debug!("Column '{header}' is not a known field name, using it as the field id");
    }
    let text = value.as_str();

    let enumerated_id = match column {
      PRIORITY_COLUMN => text.and_then(|name| enums.priority_id(name)),
      ISSUE_TYPE_COLUMN => text.and_then(|name| enums.issue_type_id(name)),
      _ => None,
    };

    match column {
      PRIORITY_COLUMN | ISSUE_TYPE_COLUMN if enumerated_id.is_some() => {
        fields.insert(field.id().to_string(), json!({ "id": enumerated_id }));
      }
      REPORTER_COLUMN | ASSIGNEE_COLUMN => {
        let target = if column == REPORTER_COLUMN { "reporter" } else { "assignee" };
        let email = value_text(value);
        match resolve_account_id(client, &email).await {
          Some(account_id) => {
            fields.insert(target.to_string(), json!({ "accountId": account_id }));
          }
          None => {
            print_warning(&format!(
              "Could not set {target} for email {email} (row {})",
              row.number
            ));
          }
        }
      }
      _ => {
        if column == PRIORITY_COLUMN || column == ISSUE_TYPE_COLUMN {
          warn!("Row {}: unknown {column} '{}', sending it unchanged", row.number, value_text(value));
        }
        fields.insert(field.id().to_string(), value.clone());
      }
    }
  }

  fields
}

fn value_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.trim().to_string(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use tally_test_utils::MockJira;

  use super::*;

  fn row(number: usize, cells: &[(&str, Option<Value>)]) -> SheetRow {
    SheetRow {
      number,
      cells: cells.iter().map(|(h, v)| (h.to_string(), v.clone())).collect(),
    }
  }

  async fn metadata(client: &JiraClient) -> Result<(FieldCatalog, Enumerations)> {
    Ok((resolve_field_catalog(client).await?, resolve_enumerations(client).await?))
  }

  #[test]
  fn test_project_key_from_path() {
    assert_eq!(project_key_from_path(Path::new("tickets_PROJ.xlsx")).unwrap(), "PROJ");
    assert_eq!(
      project_key_from_path(&PathBuf::from("in_dir").join("q3_bugs_ABC.xlsx")).unwrap(),
      "ABC"
    );
    assert_eq!(project_key_from_path(Path::new("PROJ.xlsx")).unwrap(), "PROJ");
    assert_eq!(project_key_from_path(Path::new("tickets_PROJ.v2.xlsx")).unwrap(), "PROJ");
    assert_eq!(project_key_from_path(Path::new("q3.final_ABC.xlsx")).unwrap(), "ABC");
    assert!(project_key_from_path(Path::new("tickets_.xlsx")).is_err());
  }

  #[tokio::test]
  async fn test_blank_cells_are_omitted() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    let client = jira.client()?;
    let (catalog, enums) = metadata(&client).await?;

    let row = row(
      2,
      &[
        ("Summary", Some(json!("A"))),
        ("Description", None),
        ("Due date", None),
      ],
    );
    let payload = build_payload(&client, &row, "PROJ", &catalog, &enums).await;

    assert_eq!(payload.get("project"), Some(&json!({ "key": "PROJ" })));
    assert_eq!(payload.get("summary"), Some(&json!("A")));
    assert!(!payload.contains_key("description"));
    assert!(!payload.contains_key("duedate"));
    assert_eq!(payload.len(), 2);

    Ok(())
  }

  #[tokio::test]
  async fn test_enumerations_become_id_references() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    let client = jira.client()?;
    let (catalog, enums) = metadata(&client).await?;

    let row = row(
      2,
      &[
        ("Priority", Some(json!("High"))),
        ("Issue Type", Some(json!("Bug"))),
        ("Story Points", Some(json!(5))),
        ("labels", Some(json!("backend"))),
      ],
    );
    let payload = build_payload(&client, &row, "PROJ", &catalog, &enums).await;

    assert_eq!(payload.get("priority"), Some(&json!({ "id": "2" })));
    assert_eq!(payload.get("issuetype"), Some(&json!({ "id": "10001" })));
    assert_eq!(payload.get("customfield_10016"), Some(&json!(5)));
    assert_eq!(payload.get("labels"), Some(&json!("backend")));

    Ok(())
  }

  #[tokio::test]
  async fn test_unknown_priority_is_sent_unchanged() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    let client = jira.client()?;
    let (catalog, enums) = metadata(&client).await?;

    let row = row(
      2,
      &[
        ("Priority", Some(json!("Urgent"))),
        ("Issue Type", Some(json!("bug "))),
      ],
    );
    let payload = build_payload(&client, &row, "PROJ", &catalog, &enums).await;

    assert_eq!(payload.get("priority"), Some(&json!("Urgent")));
    assert_eq!(payload.get("issuetype"), Some(&json!("bug ")));

    Ok(())
  }

  #[tokio::test]
  async fn test_reporter_and_assignee_resolution() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira.mount_user("x@example.com", Some("acc-x")).await;
    jira.mount_user("ghost@example.com", None).await;
    let client = jira.client()?;
    let (catalog, enums) = metadata(&client).await?;

    let resolved = row(
      2,
      &[
        ("Reporter", Some(json!("x@example.com"))),
        ("Assignee", Some(json!("x@example.com"))),
      ],
    );
    let payload = build_payload(&client, &resolved, "PROJ", &catalog, &enums).await;
    assert_eq!(payload.get("reporter"), Some(&json!({ "accountId": "acc-x" })));
    assert_eq!(payload.get("assignee"), Some(&json!({ "accountId": "acc-x" })));

    let unresolved = row(3, &[("Reporter", Some(json!("ghost@example.com")))]);
    let payload = build_payload(&client, &unresolved, "PROJ", &catalog, &enums).await;
    assert!(!payload.contains_key("reporter"));

    Ok(())
  }

  #[tokio::test]
  async fn test_import_continues_after_failed_row() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira.mount_create_issue("PROJ").await;
    jira.mount_create_issue_failure("bad").await;
    let client = jira.client()?;

    let rows = vec![
      row(2, &[("Summary", Some(json!("A")))]),
      row(3, &[("Summary", Some(json!("bad")))]),
      row(4, &[("Summary", Some(json!("C")))]),
    ];
    let report = import_issues(&client, &rows, "PROJ", ImportOptions::default()).await?;

    assert_eq!(report.created, vec!["PROJ-1", "PROJ-2"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].row, 3);
    assert!(report.failed[0].error.contains("Summary is not allowed here"));
    assert!(!report.is_success());
    assert_eq!(jira.created_issue_fields().await.len(), 3);

    Ok(())
  }

  #[tokio::test]
  async fn test_metadata_fetched_once_per_batch() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira.mount_create_issue("PROJ").await;
    let client = jira.client()?;

    let rows: Vec<SheetRow> = (0..3)
      .map(|i| row(i + 2, &[("Summary", Some(json!(format!("row {i}"))))]))
      .collect();
    import_issues(&client, &rows, "PROJ", ImportOptions::default()).await?;

    assert_eq!(jira.request_count("field").await, 1);
    assert_eq!(jira.request_count("priority").await, 1);
    assert_eq!(jira.request_count("issuetype").await, 1);

    Ok(())
  }

  #[tokio::test]
  async fn test_dry_run_creates_nothing() -> Result<()> {
    let jira = MockJira::start().await;
    jira.mount_default_metadata().await;
    jira.mount_create_issue("PROJ").await;
    let client = jira.client()?;

    let rows = vec![row(2, &[("Summary", Some(json!("A")))])];
    let report = import_issues(&client, &rows, "PROJ", ImportOptions { dry_run: true }).await?;

    assert!(report.created.is_empty());
    assert_eq!(report.previewed.len(), 1);
    assert_eq!(report.previewed[0].get("summary"), Some(&json!("A")));
    assert!(jira.created_issue_fields().await.is_empty());

    Ok(())
  }
}
