//! # Import Action
//!
//! Reads the input spreadsheet and creates one issue per row.

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::output::{format_path, format_project_key, print_info, print_success};
use tally_core::spreadsheet::read_rows;
use tally_core::{ImportOptions, import_issues, project_key_from_path};
use tally_jira::JiraClient;
use tokio::runtime::Runtime;
use tracing::info;

pub(crate) struct ImportArgs<'a> {
  pub file: &'a Path,
  /// Overrides the key derived from the file name
  pub project: Option<&'a str>,
  pub dry_run: bool,
}

/// Handle the --import action
pub(crate) fn handle_import_command(rt: &Runtime, client: &JiraClient, args: &ImportArgs<'_>) -> Result<()> {
  let project_key = match args.project {
    Some(key) => key.trim().to_string(),
    None => project_key_from_path(args.file)?,
  };
  anyhow::ensure!(!project_key.is_empty(), "Project key must not be empty");

  let rows = read_rows(args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
  info!("Read {} row(s) from {}", rows.len(), args.file.display());
  if rows.is_empty() {
    print_info(&format!("No rows to import in {}", format_path(args.file)));
    return Ok(());
  }

  let options = ImportOptions { dry_run: args.dry_run };
  let report = rt.block_on(import_issues(client, &rows, &project_key, options))?;

  if args.dry_run {
    print_info(&format!(
      "Dry run: {} issue(s) would be created in {}",
      report.previewed.len(),
      format_project_key(&project_key)
    ));
    return Ok(());
  }

  if report.is_success() {
    print_success(&format!(
      "Created {} issue(s) in {}",
      report.created.len(),
      format_project_key(&project_key)
    ));
    return Ok(());
  }

  let rows: Vec<String> = report.failed.iter().map(|failure| failure.row.to_string()).collect();
  anyhow::bail!(
    "Created {} issue(s) in {project_key}; {} row(s) failed (rows {})",
    report.created.len(),
    report.failed.len(),
    rows.join(", ")
  )
}
