//! Read issue rows from a workbook

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::Timelike;
use serde_json::{Number, Value};
use tracing::{debug, warn};

/// One data row of the input sheet.
///
/// Cells keep the header order of the sheet. A `None` value is a blank cell
/// and means "field not set".
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
  /// 1-based row number as shown in the spreadsheet application
  pub number: usize,
  pub cells: Vec<(String, Option<Value>)>,
}

impl SheetRow {
  /// Iterate over the non-blank cells as (header, value)
  pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
    self
      .cells
      .iter()
      .filter_map(|(header, value)| value.as_ref().map(|v| (header.as_str(), v)))
  }

  /// Whether every cell in the row is blank
  pub fn is_blank(&self) -> bool {
    self.cells.iter().all(|(_, value)| value.is_none())
  }
}

/// Read the first worksheet of `path` as a header row followed by data rows.
///
/// Columns with an empty header are ignored and fully blank rows are skipped.
pub fn read_rows(path: &Path) -> Result<Vec<SheetRow>> {
  let mut workbook =
    open_workbook_auto(path).with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

  let sheet_name = workbook
    .sheet_names()
    .first()
    .cloned()
    .with_context(|| format!("Spreadsheet has no sheets: {}", path.display()))?;

  let range = workbook
    .worksheet_range(&sheet_name)
    .with_context(|| format!("Failed to read sheet: {sheet_name}"))?;

  let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
  let mut rows = range.rows();

  let Some(header) = rows.next() else {
    debug!("Sheet '{sheet_name}' is empty");
    return Ok(Vec::new());
  };

  let headers: Vec<Option<String>> = header
    .iter()
    .map(|cell| cell_value(cell).map(|value| header_text(&value)))
    .collect();

  let mut out = Vec::new();
  for (idx, row) in rows.enumerate() {
    let cells = headers
      .iter()
      .enumerate()
      .filter_map(|(col, header)| {
        let header = header.as_ref()?;
        Some((header.clone(), row.get(col).and_then(cell_value)))
      })
      .collect();

    // header is row first_row + 1 in 1-based numbering, data starts after it
    let sheet_row = SheetRow {
      number: first_row + idx + 2,
      cells,
    };
    if sheet_row.is_blank() {
      continue;
    }
    out.push(sheet_row);
  }

  debug!("Read {} row(s) from sheet '{sheet_name}'", out.len());
  Ok(out)
}

fn header_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.trim().to_string(),
    other => other.to_string(),
  }
}

/// Convert a cell into the JSON value sent to Jira, or `None` when blank.
///
/// Excel stores every number as a float, so integral floats become integers.
pub fn cell_value(cell: &Data) -> Option<Value> {
  match cell {
    Data::Empty => None,
    Data::String(s) if s.trim().is_empty() => None,
    Data::String(s) => Some(Value::String(s.clone())),
    Data::Int(i) => Some(Value::from(*i)),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(Value::from(*f as i64)),
    Data::Float(f) => Number::from_f64(*f).map(Value::Number),
    Data::Bool(b) => Some(Value::Bool(*b)),
    Data::DateTime(dt) => match dt.as_datetime() {
      Some(datetime) if datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0 => {
        Some(Value::String(datetime.format("%Y-%m-%d").to_string()))
      }
      Some(datetime) => Some(Value::String(datetime.format("%Y-%m-%dT%H:%M:%S%.3f+0000").to_string())),
      None => Some(Value::String(cell.to_string())),
    },
    Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    Data::Error(e) => {
      warn!("Ignoring cell with spreadsheet error: {e:?}");
      None
    }
  }
}
