//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: exact path lookup in an immutable
//! route table, then a single generic handler for every endpoint.

use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::model;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::convert::Infallible;
use std::time::{Duration, Instant};

/// Fixed response bound to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub message: &'static str,
    pub status: &'static str,
    /// Explicitly committed status code; 200 when `None`
    pub code: Option<StatusCode>,
}

impl Endpoint {
    pub const fn new(message: &'static str, status: &'static str) -> Self {
        Self {
            message,
            status,
            code: None,
        }
    }

    #[must_use]
    pub const fn with_code(self, code: StatusCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    /// Status code sent to the client
    pub fn status_code(&self) -> StatusCode {
        self.code.unwrap_or(StatusCode::OK)
    }

    /// Fresh response body for one request
    pub fn response(&self) -> model::Response {
        model::Response::new(self.message, self.status)
    }
}

/// Immutable mapping from literal request paths to endpoints
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<&'static str, Endpoint>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint, replacing any previous one for the same path
    #[must_use]
    pub fn route(mut self, path: &'static str, endpoint: Endpoint) -> Self {
        self.routes.insert(path, endpoint);
        self
    }

    /// Greeting and health endpoints served by default
    pub fn builtin() -> Self {
        Self::new()
            .route("/hello", Endpoint::new("Hello, World!", "success"))
            .route(
                "/health",
                Endpoint::new("Service is healthy", "ok").with_code(StatusCode::OK),
            )
            .route("/hello-go", Endpoint::new("Hello, Go!", "success"))
            .route("/hello-cat", Endpoint::new("Hello, Cat! 🐱", "success"))
            .route("/hello-dog", Endpoint::new("Hello, Dog! 🐶🐶", "success"))
            .route(
                "/hello-bird",
                Endpoint::new("Hello, Bird! 🐦🐦 fix bug !!", "success"),
            )
    }

    /// Exact, case-sensitive path lookup
    pub fn lookup(&self, path: &str) -> Option<&Endpoint> {
        self.routes.get(path)
    }

    /// Registered paths in sorted order
    pub fn paths(&self) -> Vec<&'static str> {
        let mut paths: Vec<_> = self.routes.keys().copied().collect();
        paths.sort_unstable();
        paths
    }
}

/// Per-request logging context
pub struct RequestContext {
    pub remote_addr: String,
    pub access_log: bool,
    pub access_log_format: String,
}

/// Main entry point for HTTP request handling
///
/// The request method, body and query string never influence the response.
pub async fn handle_request<B>(
    req: Request<B>,
    routes: &RouteTable,
    ctx: &RequestContext,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
{
    let started = Instant::now();
    let is_head = *req.method() == Method::HEAD;
    let response = dispatch(req.uri().path(), routes, is_head);

    if ctx.access_log {
        let entry = access_log_entry(ctx, &req, &response, started.elapsed());
        logger::log_access(&entry, &ctx.access_log_format);
    }

    Ok(response)
}

/// Access log entry for a finished request; `body_bytes` counts what is
/// actually sent, so 0 for HEAD
fn access_log_entry<B>(
    ctx: &RequestContext,
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    elapsed: Duration,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::from_request(ctx.remote_addr.clone(), req);
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    entry
}

/// Resolve a path to its response
pub fn dispatch(path: &str, routes: &RouteTable, is_head: bool) -> Response<Full<Bytes>> {
    routes.lookup(path).map_or_else(
        || http::build_404_response(is_head),
        |endpoint| serve_endpoint(endpoint, is_head),
    )
}

/// Generic handler shared by every registered path
fn serve_endpoint(endpoint: &Endpoint, is_head: bool) -> Response<Full<Bytes>> {
    http::json_response(endpoint.status_code(), &endpoint.response(), is_head)
}
