//! Startup errors
//!
//! Everything that can go wrong before the server accepts its first
//! connection. All of these are fatal; per-request problems never surface
//! here.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StartupError {
    /// Configuration file or overrides could not be loaded
    Config(::config::ConfigError),
    /// Root directory could not be made absolute
    InvalidDir { dir: String, source: io::Error },
    /// Root directory has no regular `index.html`
    MissingIndex(PathBuf),
    /// `index.html` exists but cannot be opened
    UnreadableIndex { path: PathBuf, source: io::Error },
    /// host/port do not form a socket address
    InvalidAddress(String),
    /// Listener could not be bound
    Bind { addr: SocketAddr, source: io::Error },
    /// Log files could not be opened
    Logger(io::Error),
    /// Tokio runtime could not be built
    Runtime(io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::InvalidDir { dir, source } => write!(f, "invalid dir '{dir}': {source}"),
            Self::MissingIndex(path) => {
                write!(f, "cannot find index.html at: {}", path.display())
            }
            Self::UnreadableIndex { path, source } => {
                write!(f, "cannot read index.html at {}: {source}", path.display())
            }
            Self::InvalidAddress(addr) => write!(f, "invalid listen address: {addr}"),
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Logger(e) => write!(f, "failed to open log file: {e}"),
            Self::Runtime(e) => write!(f, "failed to start runtime: {e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InvalidDir { source, .. }
            | Self::UnreadableIndex { source, .. }
            | Self::Bind { source, .. } => Some(source),
            Self::Logger(e) | Self::Runtime(e) => Some(e),
            Self::MissingIndex(_) | Self::InvalidAddress(_) => None,
        }
    }
}

impl From<::config::ConfigError> for StartupError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_index_message_names_path() {
        let err = StartupError::MissingIndex(PathBuf::from("/srv/app/index.html"));
        assert_eq!(err.to_string(), "cannot find index.html at: /srv/app/index.html");
    }

    #[test]
    fn test_bind_error_exposes_source() {
        use std::error::Error;

        let err = StartupError::Bind {
            addr: "127.0.0.1:4173".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("127.0.0.1:4173"));
        assert!(err.source().is_some());
    }
}
