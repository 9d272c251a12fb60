//! Request path resolution
//!
//! Maps an untrusted request path onto a file inside the root directory.
//! The path is cleaned as if rooted at `/` before it is joined, so `..`
//! segments can never climb above the root.

use std::path::{Path, PathBuf};

/// Entry document served for `/` and for every unmatched route
pub const INDEX_FILE: &str = "index.html";

/// Select the file to serve for `request_path`.
///
/// Tries, in order, the path itself, the path with `.html` appended and
/// `<path>/index.html`; the first regular file wins. Anything else falls
/// back to `<root>/index.html`.
///
/// # Examples
/// ```no_run
/// use spa_serve::resolver::resolve;
/// use std::path::Path;
///
/// let root = Path::new("/srv/app");
/// assert_eq!(resolve("/", root), root.join("index.html"));
/// ```
pub fn resolve(request_path: &str, root: &Path) -> PathBuf {
    let index = root.join(INDEX_FILE);
    if request_path.is_empty() || request_path == "/" {
        return index;
    }

    let cleaned = clean_path(request_path);
    let relative = cleaned.trim_start_matches('/');

    // Everything collapsed away ("/..", "//./"), which is the root itself
    if relative.is_empty() {
        return index;
    }

    let base = root.join(relative);
    candidates(&base)
        .into_iter()
        .find(|candidate| is_regular_file(candidate))
        .unwrap_or(index)
}

/// Candidate files for a base path, in lookup order
pub fn candidates(base: &Path) -> [PathBuf; 3] {
    let mut with_html = base.as_os_str().to_owned();
    with_html.push(".html");

    [
        base.to_path_buf(),
        PathBuf::from(with_html),
        base.join(INDEX_FILE),
    ]
}

/// Lexically clean a request path as if it were rooted at `/`.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment and
/// is discarded at the root. The result always starts with `/`.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    format!("/{}", segments.join("/"))
}

/// True when `path` exists and is a regular file (symlinks are followed)
pub fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| meta.file_type().is_file())
}

// Backslash is a separator for the host filesystem on Windows, so it has to
// be cleaned too or `..\..` would survive as a single segment.
const fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}
