// Application state module
// Validated configuration shared read-only with every connection

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::error::StartupError;
use crate::resolver::{self, INDEX_FILE};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Absolute root directory, known to contain a regular index.html
    pub root: PathBuf,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Validate the configured directory and build the shared state
    pub fn new(config: Config) -> Result<Self, StartupError> {
        let root = validate_root(&config.server.dir)?;
        Ok(Self {
            config,
            root,
            active_connections: AtomicUsize::new(0),
        })
    }
}

/// Make `dir` absolute and check it holds a readable regular `index.html`.
pub fn validate_root(dir: &str) -> Result<PathBuf, StartupError> {
    let root = absolute_dir(Path::new(dir)).map_err(|source| StartupError::InvalidDir {
        dir: dir.to_string(),
        source,
    })?;

    let index = root.join(INDEX_FILE);
    if !resolver::is_regular_file(&index) {
        return Err(StartupError::MissingIndex(index));
    }
    if let Err(source) = File::open(&index) {
        return Err(StartupError::UnreadableIndex {
            path: index,
            source,
        });
    }

    Ok(root)
}

/// Absolute, lexically cleaned form of `dir` (symlinks are not resolved)
fn absolute_dir(dir: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(dir)?;

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    Ok(cleaned)
}
