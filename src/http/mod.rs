//! HTTP protocol layer module
//!
//! Protocol helpers for the file responder: content types, validators,
//! byte ranges and response builders. Nothing here touches the filesystem.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_412_response, build_416_response, build_error_response,
    build_file_response, build_io_error_response, build_partial_response, empty_body, full_body,
    FileHeaders, ResponseBody,
};
