//! Static file server for built single-page applications.
//!
//! Requests are resolved against a root directory with a small set of
//! fallback rules (exact file, `.html` suffix, directory `index.html`) and
//! anything unmatched is answered with the root `index.html` so the
//! client-side router can take over.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod server;
