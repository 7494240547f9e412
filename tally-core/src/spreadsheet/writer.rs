//! Write template workbooks

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{
  Color, DataValidation, Format, FormatAlign, Formula, Table, TableColumn, TableStyle, Workbook, Worksheet,
};
use tracing::debug;

/// Name of the table covering the header and the empty data rows
pub const TABLE_NAME: &str = "Jira_Issues";

/// Number of header rows above the table data
pub const HEADER_ROW_COUNT: u32 = 1;

/// Number of empty data rows inside the table
pub const TABLE_DATA_ROWS: u32 = 20;

/// Last zero-based row (row 1001 in Excel) covered by list validations
pub const VALIDATION_LAST_ROW: u32 = 1000;

/// Excel's limit on the length of a literal comma-separated list source
pub const LIST_SOURCE_LIMIT: usize = 255;

/// Name of the sheet users fill in
pub const ISSUES_SHEET: &str = "Issues";

const LISTS_SHEET: &str = "Lists";
const INPUT_TITLE_LIMIT: usize = 32;
const MESSAGE_LIMIT: usize = 255;

/// A column of a generated template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateColumn {
  pub name: String,
  /// Allowed values for a dropdown, or `None` for a free-text column
  pub choices: Option<Vec<String>>,
}

impl TemplateColumn {
  /// A free-text column
  pub fn plain(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      choices: None,
    }
  }

  /// A column restricted to `choices`
  pub fn dropdown(name: impl Into<String>, choices: Vec<String>) -> Self {
    Self {
      name: name.into(),
      choices: Some(choices),
    }
  }
}

/// Write a template workbook to `path`.
///
/// The first sheet holds a styled header, the named table, and one list
/// validation per dropdown column. Lists too long for an inline source are
/// placed on a hidden `Lists` sheet and referenced by range.
pub fn write_template(path: &Path, columns: &[TemplateColumn]) -> Result<()> {
  anyhow::ensure!(!columns.is_empty(), "A template needs at least one column");

  let mut workbook = Workbook::new();
  let mut sheet = Worksheet::new();
  sheet.set_name(ISSUES_SHEET)?;
  let mut lists = Worksheet::new();
  lists.set_name(LISTS_SHEET)?;
  let mut lists_used: u16 = 0;

  let header_format = Format::new()
    .set_bold()
    .set_align(FormatAlign::Center)
    .set_background_color(Color::Gray)
    .set_font_color(Color::White);

  let last_col = (columns.len() - 1) as u16;
  let table_columns: Vec<TableColumn> = columns
    .iter()
    .map(|column| TableColumn::new().set_header(column.name.as_str()))
    .collect();
  let table = Table::new()
    .set_name(TABLE_NAME)
    .set_style(TableStyle::Light12)
    .set_columns(&table_columns);
  sheet
    .add_table(0, 0, TABLE_DATA_ROWS, last_col, &table)
    .context("Failed to add issue table")?;

  for (idx, column) in columns.iter().enumerate() {
    let col = idx as u16;
    sheet.write_string_with_format(0, col, column.name.as_str(), &header_format)?;
    sheet.set_column_width(col, column.name.chars().count().max(12) as f64 + 2.0)?;

    let Some(choices) = column.choices.as_ref().filter(|choices| !choices.is_empty()) else {
      continue;
    };

    let joined = choices.join(",");
    // A literal list source is comma-separated, so values with commas need a range
    let inline = joined.chars().count() <= LIST_SOURCE_LIMIT && !choices.iter().any(|choice| choice.contains(','));
    let validation = if inline {
      DataValidation::new().allow_list_strings(choices.as_slice())?
    } else {
      for (row, choice) in choices.iter().enumerate() {
        lists.write_string(row as u32, lists_used, choice.as_str())?;
      }
      let letter = column_letter(lists_used);
      let formula = format!("={LISTS_SHEET}!${letter}$1:${letter}${}", choices.len());
      lists_used += 1;
      DataValidation::new().allow_list_formula(Formula::new(formula))
    };

    let validation = validation
      .set_input_title(truncate(&column.name, INPUT_TITLE_LIMIT))?
      .set_input_message(truncate(&format!("Pick a value for {}", column.name), MESSAGE_LIMIT))?
      .set_error_title("Invalid input")?
      .set_error_message(truncate(&format!("Must be one of {joined}"), MESSAGE_LIMIT))?;

    sheet
      .add_data_validation(HEADER_ROW_COUNT, col, VALIDATION_LAST_ROW, col, &validation)
      .with_context(|| format!("Failed to add dropdown for column '{}'", column.name))?;
  }

  workbook.push_worksheet(sheet);
  if lists_used > 0 {
    lists.set_hidden(true);
    workbook.push_worksheet(lists);
  }

  workbook
    .save(path)
    .with_context(|| format!("Failed to save template: {}", path.display()))?;
  debug!("Wrote template with {} column(s) to {}", columns.len(), path.display());

  Ok(())
}

/// Excel column letters for a zero-based index (0 → A, 26 → AA)
fn column_letter(mut col: u16) -> String {
  let mut letters = Vec::new();
  loop {
    letters.push(char::from(b'A' + (col % 26) as u8));
    if col < 26 {
      break;
    }
    col = col / 26 - 1;
  }
  letters.iter().rev().collect()
}

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis
fn truncate(text: &str, limit: usize) -> String {
  if text.chars().count() <= limit {
    return text.to_string();
  }
  let mut cut: String = text.chars().take(limit - 1).collect();
  cut.push('…');
  cut
}
