//! HTTP cache control module
//!
//! Provides `ETag` generation, HTTP dates and conditional request checks.

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate an `ETag` from file size and modification time
///
/// # Returns
/// Quoted `ETag` string, e.g., `"2ea4c5f1.0-1a2b"`
pub fn generate_etag(len: u64, modified: Option<DateTime<Utc>>) -> String {
    match modified {
        Some(time) => format!(
            "\"{:x}.{:x}-{len:x}\"",
            time.timestamp(),
            time.timestamp_subsec_nanos()
        ),
        None => format!("\"{len:x}\""),
    }
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma separated list, weak validators
/// (`W/"abc"`, compared weakly) and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Format a timestamp as an HTTP date
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date (IMF-fixdate only)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Outcome of evaluating `If-None-Match` and `If-Modified-Since`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve the representation normally
    Proceed,
    /// 304, only for GET and HEAD
    NotModified,
    /// 412, a matching `If-None-Match` on any other method
    Failed,
}

/// Evaluate the cache validators sent with a request.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent, and only for GET and HEAD. HTTP dates have second
/// precision, so the modification time is truncated before comparing.
pub fn check_preconditions(
    get_or_head: bool,
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    last_modified: Option<DateTime<Utc>>,
) -> Precondition {
    if if_none_match.is_some() {
        return match (check_etag_match(if_none_match, etag), get_or_head) {
            (false, _) => Precondition::Proceed,
            (true, true) => Precondition::NotModified,
            (true, false) => Precondition::Failed,
        };
    }

    if !get_or_head {
        return Precondition::Proceed;
    }

    match (if_modified_since.and_then(parse_http_date), last_modified) {
        (Some(since), Some(modified)) if modified.timestamp() <= since.timestamp() => {
            Precondition::NotModified
        }
        _ => Precondition::Proceed,
    }
}

/// Check an `If-Range` validator; a missing header always allows the range.
///
/// Entity tags must match strongly, dates must equal `Last-Modified` exactly.
pub fn if_range_matches(if_range: Option<&str>, etag: &str, last_modified: Option<&str>) -> bool {
    let Some(value) = if_range.map(str::trim) else {
        return true;
    };

    if value.starts_with('"') || value.starts_with("W/") {
        return value == etag;
    }

    last_modified.is_some_and(|lm| lm == value)
}

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// Cache but revalidate before every use
    NoCache,
}

impl CachePolicy {
    /// Policy for a served file: the app shell is always revalidated
    pub const fn for_content(is_html: bool, max_age: u32) -> Self {
        if is_html {
            Self::NoCache
        } else {
            Self::Public(max_age)
        }
    }

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}
