//! Request handler module
//!
//! Resolves every request to a file under the root directory and serves it.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
