//! Embedded browser front end.

use hyper::{body::Bytes, Response};

use crate::router::RouterError;

use super::request_utils::build_asset_response;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const APP_JS: &str = include_str!("../../assets/app.js");

/// `GET /` serves the page shell.
pub fn index_page() -> Result<Response<Bytes>, RouterError> {
    build_asset_response("text/html; charset=utf-8", INDEX_HTML)
}

/// `GET /app.js` serves the script that drives the table and dialogs.
pub fn app_script() -> Result<Response<Bytes>, RouterError> {
    build_asset_response("application/javascript; charset=utf-8", APP_JS)
}
