//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! lookup, then the fixed header augmentation and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body as _;
use hyper::header::{self, HeaderValue};
use hyper::http::request::Parts;
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) path, without query
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (req, _) = req.into_parts();
    let method = &req.method;

    let mut response = if *method == Method::GET || *method == Method::HEAD {
        let ctx = RequestContext {
            path: req.uri.path(),
            query: req.uri.query(),
            is_head: *method == Method::HEAD,
            if_modified_since: req
                .headers
                .get(header::IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok()),
        };
        static_files::serve_path(&ctx, &state).await
    } else {
        http::build_501_response(method.as_str())
    };

    finalize_headers(&mut response, &state.config.http.server_name);

    if state.config.logging.access_log {
        log_access(&req, &response, &state, remote_addr, started);
    }

    Ok(response)
}

/// Add the `Server` header, then the fixed CORS/no-cache triple
fn finalize_headers(response: &mut HttpResponse, server_name: &str) {
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(header::SERVER, value);
    }
    http::apply_cors_headers(response.headers_mut());
}

fn log_access(
    req: &Parts,
    response: &HttpResponse,
    state: &AppState,
    remote_addr: SocketAddr,
    started: Instant,
) {
    let uri = req
        .uri
        .path_and_query()
        .map_or_else(|| req.uri.path().to_string(), ToString::to_string);

    let mut entry =
        AccessLogEntry::new(remote_addr.ip().to_string(), req.method.to_string(), uri);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok());
    entry.referer = header_string(req, header::REFERER);
    entry.user_agent = header_string(req, header::USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn header_string(req: &Parts, name: header::HeaderName) -> Option<String> {
    req.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
