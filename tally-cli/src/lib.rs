//! # Tally CLI Library
//!
//! Command-line surface of tally: argument parsing, Jira client setup from
//! the config file, and the check, import and template actions.

pub mod cli;
pub mod clients;
