//! # Template Action
//!
//! Writes one import template per requested project key.

use std::path::Path;

use anyhow::Result;
use tally_core::generate_template;
use tally_core::output::print_success;
use tally_jira::JiraClient;
use tokio::runtime::Runtime;

/// Handle the --template action
pub(crate) fn handle_template_command(
  rt: &Runtime,
  client: &JiraClient,
  keys: &[String],
  output_dir: &Path,
) -> Result<()> {
  let keys: Vec<&str> = keys.iter().map(|key| key.trim()).filter(|key| !key.is_empty()).collect();
  anyhow::ensure!(!keys.is_empty(), "No project keys given for --template");

  let report = rt.block_on(generate_template(client, &keys, output_dir))?;

  if report.is_success() {
    print_success(&format!("Generated {} template(s)", report.written.len()));
    return Ok(());
  }

  let failed: Vec<&str> = report.failed.iter().map(|failure| failure.project_key.as_str()).collect();
  anyhow::bail!(
    "Generated {} of {} template(s); failed for {}",
    report.written.len(),
    keys.len(),
    failed.join(", ")
  )
}
