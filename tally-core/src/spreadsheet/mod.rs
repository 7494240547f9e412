//! # Spreadsheet I/O
//!
//! Reading issue rows from the first worksheet of a workbook, and writing
//! template workbooks with a named table and list validations.

mod reader;
mod writer;

pub use reader::{SheetRow, cell_value, read_rows};
pub use writer::{
  HEADER_ROW_COUNT, ISSUES_SHEET, LIST_SOURCE_LIMIT, TABLE_DATA_ROWS, TABLE_NAME, TemplateColumn, VALIDATION_LAST_ROW,
  write_template,
};
