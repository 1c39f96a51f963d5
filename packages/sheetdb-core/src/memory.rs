//! In-process tabular service.
//!
//! Keeps a single sheet as a grid of strings whose first row is the header,
//! and resolves A1 ranges and row intervals the way the remote service does.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::range::{A1Range, SheetLayout};
use crate::record::Record;
use crate::service::{Rows, TabularService};

/// Column titles written to the header row of a fresh sheet.
pub const DEFAULT_HEADER: [&str; 3] = ["First Name", "Last Name", "Email"];

/// A spreadsheet held in memory.
pub struct MemorySheet {
    sheet_name: String,
    sheet_id: u32,
    grid: Mutex<Rows>,
}

impl MemorySheet {
    /// Creates a sheet containing only the header row.
    pub fn new(layout: &SheetLayout) -> Self {
        let header = DEFAULT_HEADER.iter().map(|s| s.to_string()).collect();
        Self {
            sheet_name: layout.sheet_name.clone(),
            sheet_id: layout.sheet_id,
            grid: Mutex::new(vec![header]),
        }
    }

    /// Creates a sheet pre-populated with `records` below the header.
    pub fn with_records(layout: &SheetLayout, records: &[Record]) -> Self {
        let sheet = Self::new(layout);
        sheet
            .grid
            .lock()
            .extend(records.iter().map(Record::to_row));
        sheet
    }

    /// Returns a copy of the whole grid, header included.
    pub fn snapshot(&self) -> Rows {
        self.grid.lock().clone()
    }

    fn resolve(&self, operation: &'static str, text: &str) -> Result<A1Range> {
        let unparsable = || rejected(operation, format!("Unable to parse range: {}", text));
        let range = A1Range::parse(text).map_err(|_| unparsable())?;
        match &range.sheet {
            Some(sheet) if *sheet != self.sheet_name => Err(unparsable()),
            _ => Ok(range),
        }
    }
}

#[async_trait]
impl TabularService for MemorySheet {
    async fn read_values(&self, range: &str) -> Result<Rows> {
        let range = self.resolve("read", range)?;
        let grid = self.grid.lock();

        let first = range.start_row - 1;
        let last = range.end_row.unwrap_or(grid.len()).min(grid.len());

        let mut rows: Rows = grid
            .iter()
            .take(last)
            .skip(first)
            .map(|row| {
                let mut cells: Vec<String> = (range.start_column..=range.end_column)
                    .map(|col| row.get(col).cloned().unwrap_or_default())
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn append_values(&self, range: &str, rows: Rows) -> Result<()> {
        let range = self.resolve("append", range)?;
        check_width("append", &range, &rows)?;
        let mut grid = self.grid.lock();

        let after_data = grid
            .iter()
            .rposition(|row| {
                (range.start_column..=range.end_column)
                    .any(|col| row.get(col).is_some_and(|c| !c.is_empty()))
            })
            .map_or(0, |last| last + 1);
        let start = after_data.max(range.start_row - 1);

        write_rows(&mut grid, start, range.start_column, rows);
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Rows) -> Result<()> {
        let range = self.resolve("update", range)?;
        check_width("update", &range, &rows)?;
        if let Some(end_row) = range.end_row {
            let height = end_row - range.start_row + 1;
            if rows.len() > height {
                return Err(rejected(
                    "update",
                    format!(
                        "Requested writing within range, but tried writing {} rows into {}",
                        rows.len(),
                        height
                    ),
                ));
            }
        }

        let mut grid = self.grid.lock();
        write_rows(&mut grid, range.start_row - 1, range.start_column, rows);
        Ok(())
    }

    async fn delete_rows(&self, sheet_id: u32, start: usize, end: usize) -> Result<()> {
        if sheet_id != self.sheet_id {
            return Err(rejected(
                "delete",
                format!("No grid with id: {}", sheet_id),
            ));
        }
        if start >= end {
            return Err(rejected(
                "delete",
                format!("Invalid row interval [{}, {})", start, end),
            ));
        }

        let mut grid = self.grid.lock();
        if start >= grid.len() {
            return Err(rejected(
                "delete",
                format!(
                    "Row interval [{}, {}) is out of bounds for {} rows",
                    start,
                    end,
                    grid.len()
                ),
            ));
        }
        let end = end.min(grid.len());
        grid.drain(start..end);
        Ok(())
    }
}

fn rejected(operation: &'static str, message: String) -> StoreError {
    StoreError::Upstream {
        operation,
        status: 400,
        message,
    }
}

fn check_width(operation: &'static str, range: &A1Range, rows: &Rows) -> Result<()> {
    match rows.iter().map(Vec::len).max() {
        Some(widest) if widest > range.width() => Err(rejected(
            operation,
            format!(
                "Requested writing within range, but tried writing {} columns into {}",
                widest,
                range.width()
            ),
        )),
        _ => Ok(()),
    }
}

fn write_rows(grid: &mut Rows, start: usize, column: usize, rows: Rows) {
    for (offset, cells) in rows.into_iter().enumerate() {
        let target = start + offset;
        if grid.len() <= target {
            grid.resize_with(target + 1, Vec::new);
        }
        let row = &mut grid[target];
        if row.len() < column + cells.len() {
            row.resize(column + cells.len(), String::new());
        }
        for (i, cell) in cells.into_iter().enumerate() {
            row[column + i] = cell;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn sheet_with(records: &[(&str, &str, &str)]) -> MemorySheet {
        let records: Vec<Record> = records
            .iter()
            .map(|(f, l, e)| Record::new(*f, *l, *e))
            .collect();
        MemorySheet::with_records(&SheetLayout::default(), &records)
    }

    #[tokio::test]
    async fn test_read_skips_header_and_trims() {
        let sheet = sheet_with(&[("A", "B", "a@x.com"), ("C", "", "")]);
        let rows = sheet.read_values("Sheet1!A2:C").await.unwrap();
        assert_eq!(rows, vec![row(&["A", "B", "a@x.com"]), row(&["C"])]);

        let empty = MemorySheet::new(&SheetLayout::default());
        assert!(empty.read_values("Sheet1!A2:C").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_bounded_range() {
        let sheet = sheet_with(&[("A", "B", "a"), ("C", "D", "c"), ("E", "F", "e")]);
        let rows = sheet.read_values("Sheet1!A3:C3").await.unwrap();
        assert_eq!(rows, vec![row(&["C", "D", "c"])]);
    }

    #[tokio::test]
    async fn test_append_lands_after_last_data_row() {
        let sheet = sheet_with(&[("A", "B", "a")]);
        sheet
            .append_values("Sheet1!A2:C", vec![row(&["C", "D", "c"])])
            .await
            .unwrap();
        let grid = sheet.snapshot();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[2], row(&["C", "D", "c"]));
    }

    #[tokio::test]
    async fn test_append_to_empty_sheet_starts_below_header() {
        let sheet = MemorySheet::new(&SheetLayout::default());
        sheet
            .append_values("Sheet1!A2:C", vec![row(&["J", "D", "j@d.com"])])
            .await
            .unwrap();
        let grid = sheet.snapshot();
        assert_eq!(grid[0], row(&DEFAULT_HEADER));
        assert_eq!(grid[1], row(&["J", "D", "j@d.com"]));
    }

    #[tokio::test]
    async fn test_update_past_end_pads_grid() {
        let sheet = MemorySheet::new(&SheetLayout::default());
        sheet
            .update_values("Sheet1!A4:C4", vec![row(&["X", "Y", "x@y.com"])])
            .await
            .unwrap();
        let rows = sheet.read_values("Sheet1!A2:C").await.unwrap();
        assert_eq!(rows, vec![vec![], vec![], row(&["X", "Y", "x@y.com"])]);
    }

    #[tokio::test]
    async fn test_update_rejects_oversized_values() {
        let sheet = sheet_with(&[("A", "B", "a")]);
        let err = sheet
            .update_values("Sheet1!A2:C2", vec![row(&["1", "2", "3", "4"])])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Upstream { status: 400, .. }));

        let err = sheet
            .update_values("Sheet1!A2:C2", vec![row(&["1"]), row(&["2"])])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Upstream { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_quoted_sheet_name_resolves() {
        let layout = SheetLayout {
            sheet_name: "O'Brien Team".to_string(),
            ..SheetLayout::default()
        };
        let sheet = MemorySheet::with_records(&layout, &[Record::new("A", "B", "a")]);

        let range = layout.data_range();
        assert_eq!(range, "'O''Brien Team'!A2:C");
        let rows = sheet.read_values(&range).await.unwrap();
        assert_eq!(rows, vec![row(&["A", "B", "a"])]);

        sheet
            .update_values(&layout.row_range(0).unwrap(), vec![row(&["X", "Y", "x"])])
            .await
            .unwrap();
        assert_eq!(sheet.snapshot()[1], row(&["X", "Y", "x"]));

        let err = sheet.read_values("Sheet1!A2:C").await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_delete_interval() {
        let sheet = sheet_with(&[("A", "B", "a"), ("C", "D", "c")]);
        sheet.delete_rows(0, 1, 2).await.unwrap();
        let grid = sheet.snapshot();
        assert_eq!(grid, vec![row(&DEFAULT_HEADER), row(&["C", "D", "c"])]);
    }

    #[tokio::test]
    async fn test_delete_rejections() {
        let sheet = sheet_with(&[("A", "B", "a")]);
        for (sheet_id, start, end) in [(3, 1, 2), (0, 2, 2), (0, 5, 6)] {
            let err = sheet.delete_rows(sheet_id, start, end).await.unwrap_err();
            assert!(err.is_upstream(), "{err}");
        }
        assert_eq!(sheet.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_sheet_is_rejected() {
        let sheet = MemorySheet::new(&SheetLayout::default());
        let err = sheet.read_values("Other!A2:C").await.unwrap_err();
        assert!(matches!(err, StoreError::Upstream { operation: "read", .. }));
    }
}
