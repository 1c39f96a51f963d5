//! HTTP API for the spreadsheet record store.
//!
//! Provides the list/create/update/delete endpoints, request routing, and
//! the embedded browser front end.

pub mod handlers;
pub mod router;
pub mod server;
