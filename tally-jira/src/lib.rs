//! # Jira API Client
//!
//! Provides the slice of the Jira REST API that tally needs: the current
//! session user, projects, field and enumeration metadata, user search, and
//! issue creation.

mod client;
mod consts;
mod endpoints;
pub mod models;

// Re-export the client
pub use client::{JiraClient, create_jira_client};
// Re-export models
pub use models::{
  CreateIssueRequest, CreatedIssue, JiraAuth, JiraErrorResponse, JiraField, JiraIssueType, JiraPriority, JiraProject,
  JiraUser,
};
