//! # Client Creation
//!
//! Builds the async runtime and the authenticated Jira client used by every
//! action.

use anyhow::{Context, Result};
use tally_core::Config;
use tally_jira::{JiraClient, create_jira_client};
use tokio::runtime::{Builder, Runtime};

/// Creates an authenticated Jira client from the loaded config
pub fn create_jira_client_from_config(config: &Config) -> Result<JiraClient> {
  create_jira_client(
    &config.jira_server_url,
    &config.basic_auth.username,
    &config.basic_auth.api_token,
  )
  .context("Failed to create Jira client")
}

/// Creates a single-threaded runtime; every remote call is awaited in turn
pub fn create_runtime() -> Result<Runtime> {
  Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}

/// Creates a runtime and an authenticated Jira client
///
/// Convenience for actions that need both.
pub fn create_jira_runtime_and_client(config: &Config) -> Result<(Runtime, JiraClient)> {
  let rt = create_runtime()?;
  let client = create_jira_client_from_config(config)?;
  Ok((rt, client))
}
