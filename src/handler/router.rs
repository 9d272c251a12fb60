//! Request dispatch module
//!
//! Entry point for HTTP request processing. There is a single catch-all
//! route: every method and path is resolved to a file and served.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry};
use crate::resolver;
use hyper::header::{HeaderValue, CONTENT_LENGTH, SERVER};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request data needed to pick and serve a file, detached from the request body
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    /// Percent-decoded request path
    pub path: String,
    pub method: Method,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_range: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            path: decode_path(req.uri().path()),
            method: req.method().clone(),
            if_none_match: header_value(req, "if-none-match"),
            if_modified_since: header_value(req, "if-modified-since"),
            if_range: header_value(req, "if-range"),
            range_header: header_value(req, "range"),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Methods for which a matching validator yields 304 rather than 412
    pub fn is_get_or_head(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));
    drop(req);

    let file = resolver::resolve(&ctx.path, &state.root);
    let mut response = static_files::serve_file(&ctx, &file, state.config.http.max_age).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes(&ctx, &response);
        entry.file = Some(file.display().to_string());
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Bytes sent in the body, taken from `Content-Length` since file bodies stream
fn body_bytes(ctx: &RequestContext, response: &Response<ResponseBody>) -> u64 {
    if ctx.is_head() {
        return 0;
    }
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Percent-decode a request path; invalid UTF-8 is replaced, not rejected
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header_value(req, "referer");
    entry.user_agent = header_value(req, "user-agent");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/hello%20world.txt"), "/hello world.txt");
        assert_eq!(decode_path("/%2e%2e/%2e%2e/etc/passwd"), "/../../etc/passwd");
        assert_eq!(decode_path("/plain"), "/plain");
        assert_eq!(decode_path("/bad%ff"), "/bad\u{fffd}");
    }

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method("HEAD")
            .uri("/assets/app%20v2.js?x=1")
            .header("Range", "bytes=0-1")
            .header("If-None-Match", "\"abc\"")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.path, "/assets/app v2.js");
        assert!(ctx.is_head());
        assert!(ctx.is_get_or_head());
        assert_eq!(ctx.range_header.as_deref(), Some("bytes=0-1"));
        assert_eq!(ctx.if_none_match.as_deref(), Some("\"abc\""));
        assert!(ctx.if_range.is_none());
    }

    #[test]
    fn test_post_is_not_get_or_head() {
        let req = Request::builder().method("POST").uri("/").body(()).unwrap();
        let ctx = RequestContext::from_request(&req);
        assert!(!ctx.is_head());
        assert!(!ctx.is_get_or_head());
    }

    #[test]
    fn test_access_entry() {
        let req = Request::builder()
            .uri("/dashboard/42?tab=2")
            .header("User-Agent", "curl/8.0")
            .body(())
            .unwrap();
        let entry = access_entry(&req, "10.0.0.7:51000".parse().unwrap());
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/dashboard/42");
        assert_eq!(entry.query.as_deref(), Some("tab=2"));
        assert_eq!(entry.http_version, "1.1");
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
    }
}
