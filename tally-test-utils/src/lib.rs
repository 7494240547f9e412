//! Test utilities shared across the tally workspace
//!
//! This crate provides common testing infrastructure including:
//! - A mock Jira server with canned metadata ([`MockJira`])
//! - Temporary working directories with config and input files
//!   ([`WorkspaceGuard`])
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod jira;
pub mod workspace;

// Re-export commonly used items
pub use jira::MockJira;
pub use workspace::{WorkspaceGuard, write_sheet};
