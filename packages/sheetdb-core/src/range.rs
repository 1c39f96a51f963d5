//! A1 range addressing and the row-index arithmetic of the record store.
//!
//! Logical row indices are 0-based and exclude the header row. The service
//! addresses cells in two different ways:
//!
//! - value ranges (`Sheet1!A3:C3`) use 1-based, inclusive row numbers, so a
//!   logical index `i` lives at row `i + 2`;
//! - dimension deletes use 0-based, half-open row intervals, so the same
//!   index is the interval `[i + 1, i + 2)`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::record::RowIndex;

/// Rows reserved at the top of the sheet for column titles.
pub const HEADER_ROWS: usize = 1;

/// Most rows a spreadsheet can hold.
pub const MAX_ROWS: usize = 10_000_000;

/// Largest logical index that still addresses a row inside the sheet.
pub const MAX_ROW_INDEX: RowIndex = MAX_ROWS - HEADER_ROWS - 1;

/// Where records live inside the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Sheet (tab) title used in A1 ranges
    pub sheet_name: String,
    /// Numeric sheet id used by dimension requests (0 for the first sheet)
    pub sheet_id: u32,
    /// First record column
    pub first_column: String,
    /// Last record column
    pub last_column: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            sheet_id: 0,
            first_column: "A".to_string(),
            last_column: "C".to_string(),
        }
    }
}

impl SheetLayout {
    /// Sheet name as it appears before `!`, quoted when A1 syntax needs it.
    pub fn sheet_prefix(&self) -> String {
        if needs_quoting(&self.sheet_name) {
            format!("'{}'", self.sheet_name.replace('\'', "''"))
        } else {
            self.sheet_name.clone()
        }
    }

    /// Open-ended range covering every data row, e.g. `Sheet1!A2:C`.
    pub fn data_range(&self) -> String {
        format!(
            "{}!{}{}:{}",
            self.sheet_prefix(),
            self.first_column,
            HEADER_ROWS + 1,
            self.last_column
        )
    }

    /// Inclusive single-row range for a logical index, e.g. `Sheet1!A3:C3`
    /// for index 1.
    ///
    /// Indices past [`MAX_ROW_INDEX`] are rejected so the address can never
    /// wrap around onto the header row.
    pub fn row_range(&self, index: RowIndex) -> Result<String> {
        let row = index
            .checked_add(HEADER_ROWS + 1)
            .filter(|row| *row <= MAX_ROWS)
            .ok_or_else(|| out_of_range(index))?;
        Ok(format!(
            "{}!{}{}:{}{}",
            self.sheet_prefix(),
            self.first_column,
            row,
            self.last_column,
            row
        ))
    }

    /// Half-open, 0-based absolute row interval removing a logical index.
    pub fn delete_span(&self, index: RowIndex) -> Result<(usize, usize)> {
        let start = index
            .checked_add(HEADER_ROWS)
            .filter(|start| *start < MAX_ROWS)
            .ok_or_else(|| out_of_range(index))?;
        Ok((start, start + 1))
    }
}

fn out_of_range(index: RowIndex) -> StoreError {
    StoreError::InvalidRange(format!("row index {} is past the last sheet row", index))
}

/// Plain names are letters, digits and `_`, not starting with a digit and not
/// readable as a cell reference such as `AB12`.
fn needs_quoting(name: &str) -> bool {
    let plain = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let starts_with_digit = name.starts_with(|c: char| c.is_ascii_digit());
    let cell_like = split_cell(name).is_some_and(|(_, row)| row.is_some())
        && name.chars().take_while(char::is_ascii_alphabetic).count() <= 3;
    name.is_empty() || !plain || starts_with_digit || cell_like
}

/// A parsed A1 range such as `Sheet1!A2:C` or `A3:C3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: Option<String>,
    /// 0-based start column
    pub start_column: usize,
    /// 0-based end column, inclusive
    pub end_column: usize,
    /// 1-based start row
    pub start_row: usize,
    /// 1-based end row, inclusive; `None` means open-ended
    pub end_row: Option<usize>,
}

impl A1Range {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || StoreError::InvalidRange(text.to_string());

        let (sheet, cells) = match text.rsplit_once('!') {
            Some((sheet, cells)) => {
                let sheet = match sheet.strip_prefix('\'') {
                    Some(quoted) => quoted
                        .strip_suffix('\'')
                        .ok_or_else(invalid)?
                        .replace("''", "'"),
                    None => sheet.to_string(),
                };
                if sheet.is_empty() {
                    return Err(invalid());
                }
                (Some(sheet), cells)
            }
            None => (None, text),
        };

        let (start, end) = cells.split_once(':').ok_or_else(invalid)?;
        let (start_column, start_row) = split_cell(start).ok_or_else(invalid)?;
        let (end_column, end_row) = split_cell(end).ok_or_else(invalid)?;

        let start_row = start_row.ok_or_else(invalid)?;
        if start_row == 0 || end_column < start_column {
            return Err(invalid());
        }
        if let Some(end_row) = end_row {
            if end_row < start_row {
                return Err(invalid());
            }
        }

        Ok(Self {
            sheet,
            start_column,
            end_column,
            start_row,
            end_row,
        })
    }

    /// Number of columns covered by the range.
    pub fn width(&self) -> usize {
        self.end_column - self.start_column + 1
    }
}

/// Converts column letters to a 0-based index (`A` = 0, `AA` = 26).
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

fn split_cell(cell: &str) -> Option<(usize, Option<usize>)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let column = column_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().ok()?)
    };
    Some((column, row))
}
