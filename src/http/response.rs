//! HTTP response building module
//!
//! Builders for the status codes the file server produces.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::Response;

use super::range::ByteRange;

/// Body type of every response the server produces
///
/// File contents are streamed; error pages and empty bodies are buffered.
pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

/// Buffered body from in-memory bytes
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

/// Zero-length body (HEAD, 304)
pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// Validators and metadata shared by 200, 206 and 304 responses
#[derive(Debug, Clone, Copy)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
    pub cache_control: &'a str,
}

/// Build 200 OK response for a whole file of `len` bytes
///
/// `body` is empty for HEAD; `Content-Length` always carries the file size.
pub fn build_file_response(
    len: u64,
    body: ResponseBody,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", len)
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", headers.cache_control);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(empty_body())
    })
}

/// Build 206 Partial Content response
///
/// `body` carries only the bytes of `range`, out of `total`.
pub fn build_partial_response(
    total: u64,
    range: ByteRange,
    body: ResponseBody,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(206)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(total))
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", headers.cache_control);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("206", &e);
        Response::new(empty_body())
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(headers: &FileHeaders<'_>) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(304)
        .header("ETag", headers.etag)
        .header("Cache-Control", headers.cache_control);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(empty_body()).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(empty_body())
    })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    const MESSAGE: &str = "416 Range Not Satisfiable";

    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", MESSAGE.len())
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(full_body(MESSAGE))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(full_body(MESSAGE))
        })
}

/// Build a plain-text error response (403, 404, 412, 500)
pub fn build_error_response(status: u16, message: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", message.len())
        .body(full_body(message))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(full_body(message))
        })
}

/// Build 412 Precondition Failed response
pub fn build_412_response() -> Response<ResponseBody> {
    build_error_response(412, "412 Precondition Failed")
}

/// Map a file read failure to the response a file server would give
pub fn build_io_error_response(error: &std::io::Error) -> Response<ResponseBody> {
    match error.kind() {
        std::io::ErrorKind::NotFound => build_error_response(404, "404 Not Found"),
        std::io::ErrorKind::PermissionDenied => build_error_response(403, "403 Forbidden"),
        _ => build_error_response(500, "500 Internal Server Error"),
    }
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: FileHeaders<'static> = FileHeaders {
        content_type: "text/plain; charset=utf-8",
        etag: "\"abc\"",
        last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
        cache_control: "no-cache",
    };

    async fn body_bytes(resp: Response<ResponseBody>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_response_headers() {
        let resp = build_file_response(5, full_body("hello"), &HEADERS);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "5");
        assert_eq!(resp.headers()["etag"], "\"abc\"");
        assert_eq!(resp.headers()["accept-ranges"], "bytes");
        assert_eq!(resp.headers()["last-modified"], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(body_bytes(resp).await, "hello");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_file_response(5, empty_body(), &HEADERS);
        assert_eq!(resp.headers()["content-length"], "5");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_response() {
        let resp =
            build_partial_response(10, ByteRange { start: 2, end: 5 }, full_body("2345"), &HEADERS);
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["content-range"], "bytes 2-5/10");
        assert_eq!(resp.headers()["content-length"], "4");
        assert_eq!(body_bytes(resp).await, "2345");
    }

    #[tokio::test]
    async fn test_412_response() {
        let resp = build_412_response();
        assert_eq!(resp.status(), 412);
        assert_eq!(body_bytes(resp).await, "412 Precondition Failed");
    }

    #[test]
    fn test_io_error_mapping() {
        use std::io::{Error, ErrorKind};

        let status = |kind| build_io_error_response(&Error::from(kind)).status();
        assert_eq!(status(ErrorKind::NotFound), 404);
        assert_eq!(status(ErrorKind::PermissionDenied), 403);
        assert_eq!(status(ErrorKind::Other), 500);
    }
}
