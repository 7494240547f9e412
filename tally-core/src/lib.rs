//! # Tally Core
//!
//! Everything tally does between reading its config and printing results:
//! resolving Jira field names and enumerations, reading issue rows from a
//! spreadsheet, creating issues, and generating dropdown-validated templates.

pub mod config;
pub mod import;
pub mod output;
pub mod resolve;
pub mod spreadsheet;
pub mod template;

pub use config::{BasicAuth, Config, ConfigError, load_config};
pub use import::{ImportOptions, ImportReport, RowFailure, import_issues, project_key_from_path};
pub use resolve::{Enumerations, FieldCatalog, FieldRef};
pub use template::{KeyFailure, PRIMARY_FIELDS, TemplateReport, generate_template, order_fields, template_file_name};
