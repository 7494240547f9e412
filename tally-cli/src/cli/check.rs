//! # Connection Check
//!
//! Verifies the configured credentials by fetching the session user and the
//! visible projects.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tally_core::output::{format_project_key, print_header, print_success, print_warning};
use tally_jira::JiraClient;
use tokio::runtime::Runtime;

/// Handle the --check action
pub(crate) fn handle_check_command(rt: &Runtime, client: &JiraClient) -> Result<()> {
  rt.block_on(async {
    let user = client.current_user().await.context("Failed to authenticate")?;
    print_success(&format!("Authenticated to {} as {user}", client.base_url()));

    let projects = client.list_projects().await.context("Failed to list projects")?;
    if projects.is_empty() {
      print_warning("No projects are visible to this account");
      return Ok(());
    }

    print_header(&format!("Projects ({})", projects.len()));
    for project in &projects {
      println!(
        "  {:<10} {:<12} {}",
        project.id.dimmed(),
        format_project_key(&project.key),
        project.name
      );
    }

    Ok(())
  })
}
