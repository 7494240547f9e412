//! # Jira API Endpoints
//!
//! Endpoint implementations grouped by Jira resource type.

pub mod enumerations;
pub mod fields;
pub mod issues;
pub mod projects;
pub mod users;
