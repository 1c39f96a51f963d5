//! Record store adapter over a tabular service.

use std::sync::Arc;

use crate::error::Result;
use crate::range::SheetLayout;
use crate::record::{Record, RowIndex};
use crate::service::TabularService;

/// Maps list/append/replace/remove onto range-addressed service calls.
///
/// Stateless: every call is a single round trip and the service remains the
/// only source of truth.
#[derive(Clone)]
pub struct RecordStore {
    service: Arc<dyn TabularService>,
    layout: SheetLayout,
}

impl RecordStore {
    pub fn new(service: Arc<dyn TabularService>, layout: SheetLayout) -> Self {
        Self { service, layout }
    }

    /// Returns every data row in sheet order, header excluded.
    pub async fn list(&self) -> Result<Vec<Record>> {
        let range = self.layout.data_range();
        tracing::debug!("Listing records in {}", range);
        let rows = self
            .service
            .read_values(&range)
            .await
            .inspect_err(|e| tracing::warn!("List of {} failed: {}", range, e))?;
        Ok(rows.into_iter().map(Record::from_row).collect())
    }

    /// Adds `record` after the last data row.
    pub async fn append(&self, record: &Record) -> Result<()> {
        let range = self.layout.data_range();
        tracing::debug!("Appending record to {}", range);
        self.service
            .append_values(&range, vec![record.to_row()])
            .await
            .inspect_err(|e| tracing::warn!("Append to {} failed: {}", range, e))
    }

    /// Overwrites the row at logical `index`.
    ///
    /// The index is not checked against the current list length, only
    /// against the sheet's row limit.
    pub async fn replace(&self, record: &Record, index: RowIndex) -> Result<()> {
        let range = self.layout.row_range(index)?;
        tracing::debug!("Replacing record {} at {}", index, range);
        self.service
            .update_values(&range, vec![record.to_row()])
            .await
            .inspect_err(|e| tracing::warn!("Replace at {} failed: {}", range, e))
    }

    /// Deletes the row at logical `index`; later rows shift up by one.
    pub async fn remove(&self, index: RowIndex) -> Result<()> {
        let (start, end) = self.layout.delete_span(index)?;
        tracing::debug!(
            "Removing record {} as rows [{}, {}) of sheet {}",
            index,
            start,
            end,
            self.layout.sheet_id
        );
        self.service
            .delete_rows(self.layout.sheet_id, start, end)
            .await
            .inspect_err(|e| tracing::warn!("Remove of record {} failed: {}", index, e))
    }
}
