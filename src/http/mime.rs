//! MIME type detection module
//!
//! A short override table is consulted first, then the `mime_guess`
//! extension table, then `application/octet-stream`.

use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

/// Get the Content-Type for a file based on its extension
///
/// # Examples
/// ```
/// use spa_serve::http::mime::content_type;
/// use std::path::Path;
///
/// assert_eq!(content_type(Path::new("app.js")), "text/javascript; charset=utf-8");
/// assert_eq!(content_type(Path::new("logo.png")), "image/png");
/// assert_eq!(content_type(Path::new("LICENSE")), "application/octet-stream");
/// ```
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if let Some(content_type) = extension.as_deref().and_then(override_for) {
        return content_type;
    }

    mime_guess::from_path(path).first_raw().unwrap_or(OCTET_STREAM)
}

/// Types that must carry a charset, or differ from the library default
fn override_for(extension: &str) -> Option<&'static str> {
    match extension {
        "js" | "mjs" => Some("text/javascript; charset=utf-8"),
        "css" => Some("text/css; charset=utf-8"),
        "svg" => Some("image/svg+xml"),
        "html" | "htm" => Some("text/html; charset=utf-8"),
        "json" => Some("application/json; charset=utf-8"),
        "txt" => Some("text/plain; charset=utf-8"),
        _ => None,
    }
}

/// HTML documents are revalidated on every request
pub fn is_html(content_type: &str) -> bool {
    content_type.starts_with("text/html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        assert_eq!(content_type(Path::new("assets/app.js")), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("worker.mjs")), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("style.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(content_type(Path::new("APP.JS")), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("Index.HTML")), "text/html; charset=utf-8");
    }

    #[test]
    fn test_library_table() {
        assert_eq!(content_type(Path::new("logo.png")), "image/png");
        assert_eq!(content_type(Path::new("font.woff2")), "font/woff2");
        assert_eq!(content_type(Path::new("module.wasm")), "application/wasm");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type(Path::new("data.xyz123")), OCTET_STREAM);
        assert_eq!(content_type(Path::new("LICENSE")), OCTET_STREAM);
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(!is_html("text/css; charset=utf-8"));
    }
}
