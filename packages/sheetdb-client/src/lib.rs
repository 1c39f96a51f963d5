//! Client side of the record API.
//!
//! [`ApiClient`] talks to the four endpoints, [`Controller`] keeps the view
//! state (list, loading flag, dialogs) and re-fetches after every mutation,
//! and [`views`] renders the table and dialogs for a terminal.

pub mod api_client;
pub mod controller;
pub mod error;
pub mod views;

pub use api_client::{ApiClient, CreateRequest, RecordsApi, UpdateRequest};
pub use controller::{Controller, Notifier};
pub use error::{ClientError, Result};
