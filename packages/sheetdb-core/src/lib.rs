//! Core of the spreadsheet-backed record store.
//!
//! Provides the record model, A1 range addressing, the tabular service
//! abstraction with Google Sheets and in-memory backends, the record store
//! adapter, and configuration.

pub mod config;
pub mod error;
pub mod google;
pub mod memory;
pub mod range;
pub mod record;
pub mod service;
pub mod store;

pub use error::{Result, StoreError};
pub use record::{Record, RowIndex};
pub use store::RecordStore;
