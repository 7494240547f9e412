//! Constants for the tally-jira client.

/// User-Agent header value for the Jira API client
pub const USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Path prefix of the Jira REST API version tally talks to
pub const API_PREFIX: &str = "rest/api/2";
