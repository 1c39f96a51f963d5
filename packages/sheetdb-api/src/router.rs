//! Matchit routing configuration.

use std::sync::Arc;
use std::time::Instant;

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;
use tokio::time;

use crate::handlers;
use sheetdb_core::config::ServerConfig;
use sheetdb_core::RecordStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Record store adapter
    pub store: Arc<RecordStore>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with default routes.
    pub fn new(store: Arc<RecordStore>, config: Arc<ServerConfig>) -> Self {
        let mut router = MatchitRouter::new();

        // Browser front end
        router
            .insert("/", RouteHandler::Page)
            .expect("Failed to insert / route");
        router
            .insert("/app.js", RouteHandler::Script)
            .expect("Failed to insert /app.js route");

        // Record endpoints
        router
            .insert("/sheets", RouteHandler::Records)
            .expect("Failed to insert /sheets route");
        router
            .insert("/sheets/update", RouteHandler::Update)
            .expect("Failed to insert /sheets/update route");
        router
            .insert("/sheets/delete", RouteHandler::Delete)
            .expect("Failed to insert /sheets/delete route");

        Self {
            inner: router,
            state: AppState { store, config },
        }
    }

    /// Routes a request and always produces a response, converting errors
    /// into their JSON envelopes.
    pub async fn respond<B>(&self, req: Request<B>) -> Response<Bytes>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = match self.route(req).await {
            Ok(response) => response,
            Err(err) => {
                if matches!(err, RouterError::Upstream(_) | RouterError::InternalError(_)) {
                    tracing::error!("{} {} failed: {}", method, path, err);
                }
                Response::from(err)
            }
        };

        tracing::info!(
            "{} {} -> {} ({} ms)",
            method,
            path,
            response.status().as_u16(),
            started.elapsed().as_millis()
        );
        response
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Arguments
    /// * `req` - HTTP request
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let path = req.uri().path().to_string();
        let handler = match self.inner.at(&path) {
            Ok(matched) => *matched.value,
            Err(_) => return Err(RouterError::NotFound(format!("No route found for {}", path))),
        };

        let req = read_request_with_timeout(req, self.state.config.request_timeout_ms).await?;
        handler.handle(req, self.state.clone()).await
    }
}

/// Buffers the request body, bounded by the configured timeout.
async fn read_request_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
) -> Result<Request<Bytes>, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let collected = time::timeout(timeout_duration, body.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(Request::from_parts(parts, collected.to_bytes()))
}

/// Route handler function.
#[derive(Debug, Clone, Copy)]
enum RouteHandler {
    Page,
    Script,
    Records,
    Update,
    Delete,
}

impl RouteHandler {
    /// Dispatches on method for the matched path.
    async fn handle(
        &self,
        req: Request<Bytes>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError> {
        let method = req.method().clone();
        match (self, method) {
            (RouteHandler::Page, Method::GET) => handlers::index_page(),
            (RouteHandler::Script, Method::GET) => handlers::app_script(),
            (RouteHandler::Records, Method::GET) => handlers::list_records(req, state).await,
            (RouteHandler::Records, Method::POST) => handlers::create_record(req, state).await,
            (RouteHandler::Update, Method::PUT) => handlers::update_record(req, state).await,
            (RouteHandler::Delete, Method::DELETE) => handlers::delete_record(req, state).await,
            _ => Err(RouterError::MethodNotAllowed),
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    /// Required request data missing; the message is returned as-is
    Validation(String),
    /// Body is not valid JSON
    MalformedBody(String),
    NotFound(String),
    Timeout,
    /// The spreadsheet service failed
    Upstream(String),
    InternalError(String),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            RouterError::MalformedBody(msg) => write!(f, "Invalid JSON body: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::Upstream(msg) => write!(f, "Upstream service error: {}", msg),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl RouterError {
    /// HTTP status, short error text and optional details for the envelope.
    fn parts(&self) -> (u16, &str, Option<&str>) {
        match self {
            RouterError::MethodNotAllowed => (405, "Method Not Allowed", None),
            RouterError::Validation(msg) => (400, msg.as_str(), None),
            RouterError::MalformedBody(msg) => (400, "Invalid JSON body", Some(msg.as_str())),
            RouterError::NotFound(msg) => (404, "Not Found", Some(msg.as_str())),
            RouterError::Timeout => (408, "Request Timeout", None),
            RouterError::Upstream(msg) => (502, "Upstream service error", Some(msg.as_str())),
            RouterError::InternalError(msg) => (500, "Internal Server Error", Some(msg.as_str())),
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let (status, error, details) = err.parts();

        let error_response =
            handlers::error_response(error.to_string(), details.map(str::to_string));
        let body = serde_json::to_vec(&error_response).unwrap_or_else(|e| {
            format!(
                "{{\"error\":\"Failed to serialize error\",\"details\":\"{}\"}}",
                e
            )
            .into_bytes()
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(500)
                    .body(Bytes::from("Internal Server Error"))
                    .expect("Failed to build fallback error response")
            })
    }
}
