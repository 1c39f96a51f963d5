//! HTTP endpoint implementations for records and the browser front end.

pub mod page_handlers;
pub mod record_handlers;
pub mod request_utils;
pub mod response;

pub use page_handlers::{app_script, index_page};
pub use record_handlers::{create_record, delete_record, list_records, update_record};
pub use response::{data_response, error_response, message_response};
