//! Static file serving module
//!
//! Answers a request for the resolved file: validators, conditional
//! requests, byte ranges and HEAD handling. Headers come from the file's
//! metadata; the contents are streamed and only read when a body is sent.

use crate::handler::router::RequestContext;
use crate::http::{
    self, cache, cache::CachePolicy, cache::Precondition, empty_body, mime, ByteRange,
    FileHeaders, RangeParseResult, ResponseBody,
};
use crate::logger;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Read buffer size for streamed bodies
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// What the response needs to know about a file, taken from its metadata
#[derive(Debug, Clone, Copy)]
pub struct FileMeta {
    pub len: u64,
    pub content_type: &'static str,
    pub modified: Option<DateTime<Utc>>,
}

/// How a request for a file is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    NotModified,
    PreconditionFailed,
    Whole,
    Partial(ByteRange),
    NotSatisfiable,
}

/// Serve a single file
pub async fn serve_file(
    ctx: &RequestContext,
    file_path: &Path,
    max_age: u32,
) -> Response<ResponseBody> {
    match respond(ctx, file_path, max_age).await {
        Ok(response) => response,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            http::build_io_error_response(&e)
        }
    }
}

async fn respond(
    ctx: &RequestContext,
    file_path: &Path,
    max_age: u32,
) -> io::Result<Response<ResponseBody>> {
    let (file, meta) = open_file(file_path).await?;

    let etag = cache::generate_etag(meta.len, meta.modified);
    let last_modified = meta.modified.map(cache::format_http_date);
    let cache_control =
        CachePolicy::for_content(mime::is_html(meta.content_type), max_age).to_header_value();

    let headers = FileHeaders {
        content_type: meta.content_type,
        etag: &etag,
        last_modified: last_modified.as_deref(),
        cache_control: &cache_control,
    };

    let response = match choose_reply(ctx, &meta, &etag, last_modified.as_deref()) {
        Reply::NotModified => http::build_304_response(&headers),
        Reply::PreconditionFailed => http::build_412_response(),
        Reply::NotSatisfiable => http::build_416_response(meta.len),
        Reply::Whole => {
            let body = if ctx.is_head() {
                empty_body()
            } else {
                stream_body(file, 0, meta.len).await?
            };
            http::build_file_response(meta.len, body, &headers)
        }
        Reply::Partial(range) => {
            let body = if ctx.is_head() {
                empty_body()
            } else {
                stream_body(file, range.start, range.len()).await?
            };
            http::build_partial_response(meta.len, range, body, &headers)
        }
    };

    Ok(response)
}

/// Open a regular file and collect its metadata
pub async fn open_file(path: &Path) -> io::Result<(fs::File, FileMeta)> {
    let file = fs::File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
    }

    let meta = FileMeta {
        len: metadata.len(),
        content_type: mime::content_type(path),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
    };
    Ok((file, meta))
}

/// Decide between 304, 412, 416, a byte range and the whole file.
///
/// A stale `If-Range` validator means the client gets the whole file.
pub fn choose_reply(
    ctx: &RequestContext,
    meta: &FileMeta,
    etag: &str,
    last_modified: Option<&str>,
) -> Reply {
    match cache::check_preconditions(
        ctx.is_get_or_head(),
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
        etag,
        meta.modified,
    ) {
        Precondition::NotModified => return Reply::NotModified,
        Precondition::Failed => return Reply::PreconditionFailed,
        Precondition::Proceed => {}
    }

    if !cache::if_range_matches(ctx.if_range.as_deref(), etag, last_modified) {
        return Reply::Whole;
    }

    match http::parse_range_header(ctx.range_header.as_deref(), meta.len) {
        RangeParseResult::Valid(range) => Reply::Partial(range),
        RangeParseResult::NotSatisfiable => Reply::NotSatisfiable,
        RangeParseResult::None => Reply::Whole,
    }
}

/// Stream `len` bytes of `file` starting at `start`
async fn stream_body(mut file: fs::File, start: u64, len: u64) -> io::Result<ResponseBody> {
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let stream =
        ReaderStream::with_capacity(file.take(len), STREAM_CHUNK_SIZE).map_ok(Frame::data);
    Ok(StreamBody::new(stream).boxed())
}
