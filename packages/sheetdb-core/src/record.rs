//! The three-field record and its row representation.

use serde::{Deserialize, Serialize};

/// Zero-based position of a record within the current list.
///
/// This is the only identity a record has. It is valid until the next
/// insert or delete shifts the underlying rows.
pub type RowIndex = usize;

/// Number of cells a record occupies in a row.
pub const RECORD_WIDTH: usize = 3;

/// A first name, last name and email triple.
///
/// Serializes as a JSON array of three strings, matching the row shape the
/// spreadsheet returns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "[String; 3]")]
pub struct Record {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Record {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// Builds a record from a raw service row.
    ///
    /// The service drops trailing empty cells, so missing cells become empty
    /// strings. Cells past the third are ignored.
    pub fn from_row(cells: Vec<String>) -> Self {
        let mut cells = cells.into_iter();
        Self {
            first_name: cells.next().unwrap_or_default(),
            last_name: cells.next().unwrap_or_default(),
            email: cells.next().unwrap_or_default(),
        }
    }

    /// Returns the cells in column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
        ]
    }

    /// Display name as shown in the table view.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<Vec<String>> for Record {
    fn from(cells: Vec<String>) -> Self {
        Record::from_row(cells)
    }
}

impl From<Record> for [String; 3] {
    fn from(record: Record) -> Self {
        [record.first_name, record.last_name, record.email]
    }
}
