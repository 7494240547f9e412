//! Temporary working directories for testing
//!
//! A [`WorkspaceGuard`] owns a temporary directory that plays the role of the
//! directory tally is run from: it holds `config.json`, input spreadsheets
//! and generated templates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use serde_json::json;
use tempfile::TempDir;

/// A temporary working directory, removed on drop
pub struct WorkspaceGuard {
  pub temp_dir: TempDir,
}

impl WorkspaceGuard {
  /// Create an empty workspace
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    Self { temp_dir }
  }

  /// Path of the workspace directory
  pub fn path(&self) -> &Path {
    self.temp_dir.path()
  }

  /// Path of a file inside the workspace
  pub fn file(&self, name: &str) -> PathBuf {
    self.temp_dir.path().join(name)
  }

  /// Write a `config.json` pointing at `server_url` with the given credentials
  pub fn write_config(&self, server_url: &str, username: &str, api_token: &str) -> Result<PathBuf> {
    let path = self.file("config.json");
    let config = json!({
        "jira_server_url": server_url,
        "basic_auth": { "username": username, "api_token": api_token }
    });
    fs::write(&path, serde_json::to_string_pretty(&config)?).context("Failed to write config.json")?;
    Ok(path)
  }
}

impl Default for WorkspaceGuard {
  fn default() -> Self {
    Self::new()
  }
}

/// Write a single-sheet workbook with a header row and string cells.
///
/// `None` cells are left blank.
pub fn write_sheet(path: &Path, headers: &[&str], rows: &[Vec<Option<&str>>]) -> Result<()> {
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();

  for (col, header) in headers.iter().enumerate() {
    sheet.write_string(0, col as u16, *header)?;
  }
  for (row_idx, row) in rows.iter().enumerate() {
    for (col, cell) in row.iter().enumerate() {
      if let Some(value) = cell {
        sheet.write_string(row_idx as u32 + 1, col as u16, *value)?;
      }
    }
  }

  workbook
    .save(path)
    .with_context(|| format!("Failed to save test workbook {}", path.display()))?;
  Ok(())
}
