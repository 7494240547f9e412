//! # Command Line Interface
//!
//! Defines the flags of the tally tool and dispatches the requested actions.
//! Actions are independent and may be combined; they run in the order
//! check, import, template.

mod check;
mod import;
mod template;

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, ArgGroup, Parser};
use tally_core::config::{DEFAULT_CONFIG_FILE, ENV_CONFIG_PATH};
use tally_core::load_config;
use tally_core::output::{ColorMode, print_error};
use tracing::debug;

use crate::clients;

/// Top-level CLI for the tally tool
#[derive(Parser)]
#[command(name = "tally")]
#[command(display_name = "📋 Tally")]
#[command(about = "Create Jira issues from spreadsheets and generate import templates")]
#[command(
  long_about = "Tally moves issues between spreadsheets and Jira.\n\n\
        It can check your connection, create one Jira issue per spreadsheet row,\n\
        and write blank templates whose columns and dropdowns match a project."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(max_term_width = 120)]
#[command(group(
  ArgGroup::new("action")
    .required(true)
    .multiple(true)
    .args(["check", "import", "template"])
))]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Path to the JSON config file with the Jira URL and credentials
  #[arg(long, value_name = "PATH", env = ENV_CONFIG_PATH, default_value = DEFAULT_CONFIG_FILE)]
  pub config: PathBuf,

  /// Check the connection: show the authenticated user and all projects
  #[arg(short = 'd', long)]
  pub check: bool,

  /// Create one issue per row of FILE (the project key is taken from the
  /// file name, e.g. tickets_PROJ.xlsx)
  #[arg(short = 'f', long, value_name = "FILE")]
  pub import: Option<PathBuf>,

  /// Project key for --import instead of deriving it from the file name
  #[arg(long, value_name = "KEY", requires = "import")]
  pub project: Option<String>,

  /// Print the issue payloads for --import without creating anything
  #[arg(long, requires = "import")]
  pub dry_run: bool,

  /// Generate a template spreadsheet for each of the comma-separated project keys
  #[arg(long, alias = "new-sheets", value_name = "KEYS", value_delimiter = ',')]
  pub template: Option<Vec<String>>,

  /// Directory the templates are written to [default: current directory]
  #[arg(long, value_name = "DIR", requires = "template")]
  pub output_dir: Option<PathBuf>,
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  cli.colors.apply();

  let config = load_config(&cli.config)?;
  debug!("Loaded config for {}", config.jira_server_url);
  let (rt, client) = clients::create_jira_runtime_and_client(&config)?;

  let mut failed: Vec<&str> = Vec::new();

  if cli.check
    && let Err(e) = check::handle_check_command(&rt, &client)
  {
    print_error(&format!("Connection check failed: {e:#}"));
    failed.push("check");
  }

  if let Some(file) = &cli.import {
    let options = import::ImportArgs {
      file,
      project: cli.project.as_deref(),
      dry_run: cli.dry_run,
    };
    if let Err(e) = import::handle_import_command(&rt, &client, &options) {
      print_error(&format!("Import failed: {e:#}"));
      failed.push("import");
    }
  }

  if let Some(keys) = &cli.template {
    let output_dir = cli.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    if let Err(e) = template::handle_template_command(&rt, &client, keys, &output_dir) {
      print_error(&format!("Template generation failed: {e:#}"));
      failed.push("template");
    }
  }

  anyhow::ensure!(failed.is_empty(), "Failed action(s): {}", failed.join(", "));
  Ok(())
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_requires_an_action() {
    assert!(Cli::try_parse_from(["tally"]).is_err());
    assert!(Cli::try_parse_from(["tally", "-v"]).is_err());
  }

  #[test]
  fn test_actions_combine() {
    let cli = Cli::try_parse_from(["tally", "-d", "-f", "tickets_PROJ.xlsx", "--template", "ABC,XYZ"]).unwrap();

    assert!(cli.check);
    assert_eq!(cli.import, Some(PathBuf::from("tickets_PROJ.xlsx")));
    assert_eq!(cli.template, Some(vec!["ABC".to_string(), "XYZ".to_string()]));
  }

  #[test]
  fn test_new_sheets_alias() {
    let cli = Cli::try_parse_from(["tally", "--new-sheets", "PROJ1,PROJ2"]).unwrap();
    assert_eq!(cli.template, Some(vec!["PROJ1".to_string(), "PROJ2".to_string()]));
  }

  #[test]
  fn test_import_options_require_import() {
    assert!(Cli::try_parse_from(["tally", "-d", "--dry-run"]).is_err());
    assert!(Cli::try_parse_from(["tally", "-d", "--project", "ABC"]).is_err());
    assert!(Cli::try_parse_from(["tally", "-d", "--output-dir", "out"]).is_err());
  }
}
