//! The external tabular service contract.

use async_trait::async_trait;

use crate::error::Result;

/// Raw row values as exchanged with the service.
pub type Rows = Vec<Vec<String>>;

/// Operations the record store needs from a spreadsheet-like backend.
///
/// Ranges are A1 strings. Row numbers in ranges are 1-based and inclusive;
/// `delete_rows` takes a 0-based, half-open interval. Implementations make
/// exactly one round trip per call and never retry.
#[async_trait]
pub trait TabularService: Send + Sync {
    /// Returns the values in `range`, or no rows when it holds no data.
    async fn read_values(&self, range: &str) -> Result<Rows>;

    /// Appends `rows` immediately after the existing data in `range`.
    async fn append_values(&self, range: &str, rows: Rows) -> Result<()>;

    /// Overwrites the cells addressed by `range` with `rows`.
    async fn update_values(&self, range: &str, rows: Rows) -> Result<()>;

    /// Removes rows `start..end` from the sheet identified by `sheet_id`,
    /// shifting later rows up.
    async fn delete_rows(&self, sheet_id: u32, start: usize, end: usize) -> Result<()>;
}
