// Configuration module entry point
// Layers defaults, an optional TOML file, environment variables and CLI flags

mod cli;
mod state;
mod types;

use std::env;
use std::net::{SocketAddr, ToSocketAddrs};

use crate::logger;

// Re-export public types
pub use cli::Cli;
pub use state::{validate_root, AppState};
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file looked up when none is given (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "spa-serve";
/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SPA_SERVE_CONFIG";
/// Prefix for nested environment keys, e.g. `SPA_SERVE_HTTP__MAX_AGE`
pub const ENV_PREFIX: &str = "SPA_SERVE";

/// Values that win over the config file and defaults
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dir: Option<String>,
    pub workers: Option<usize>,
    pub access_log: Option<bool>,
}

impl Overrides {
    /// Collect overrides from command line flags
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            dir: cli.dir.clone(),
            workers: cli.workers,
            access_log: cli.quiet.then_some(false),
        }
    }

    /// Collect overrides from `HOST`, `PORT` and `DIST_DIR`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Collect overrides through an arbitrary variable lookup.
    ///
    /// Empty values count as unset. An unparsable port is ignored with a
    /// warning so the next source applies.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = get("PORT").and_then(|raw| match raw.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(e) => {
                logger::log_warning(&format!("Ignoring invalid PORT '{raw}': {e}"));
                None
            }
        });

        Self {
            host: get("HOST"),
            port,
            dir: get("DIST_DIR"),
            workers: None,
            access_log: None,
        }
    }

    /// Fill unset fields from a lower-precedence source
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            dir: self.dir.or(lower.dir),
            workers: self.workers.or(lower.workers),
            access_log: self.access_log.or(lower.access_log),
        }
    }
}

impl Config {
    /// Load configuration for a parsed command line.
    ///
    /// Precedence: CLI flag > environment > config file > default.
    pub fn load(cli: &Cli) -> Result<Self, ::config::ConfigError> {
        let explicit = cli.config.clone().or_else(|| env::var(CONFIG_ENV).ok());
        let required = explicit.is_some();
        let path = explicit.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let overrides = Overrides::from_cli(cli).or(Overrides::from_env());
        Self::load_from(&path, required, &overrides)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(
        config_path: &str,
        required: bool,
        overrides: &Overrides,
    ) -> Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(config_path).required(required))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4173)?
            .set_default("server.dir", "dist")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("http.server_name", "spa-serve")?
            .set_default("http.max_age", 3600)?
            .set_default("performance.header_read_timeout", 5)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.shutdown_grace", 10)?
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("server.dir", overrides.dir.clone())?
            .set_override_option(
                "server.workers",
                overrides.workers.and_then(|w| i64::try_from(w).ok()),
            )?
            .set_override_option("logging.access_log", overrides.access_log)?
            .build()?;

        settings.try_deserialize()
    }

    /// Resolve host and port into a socket address.
    ///
    /// Host names are looked up; the first address returned is used.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.host.as_str();
        (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| format!("{host}:{}: {e}", self.server.port))?
            .next()
            .ok_or_else(|| format!("{host}:{}: no address found", self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MISSING_FILE: &str = "/nonexistent/spa-serve-test-config";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from(MISSING_FILE, false, &Overrides::default()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 4173);
        assert_eq!(cfg.server.dir, "dist");
        assert!(cfg.server.workers.is_none());
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_age, 3600);
        assert_eq!(cfg.performance.header_read_timeout, 5);
        assert!(cfg.performance.keep_alive);
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_required_file_missing_is_error() {
        assert!(Config::load_from(MISSING_FILE, true, &Overrides::default()).is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let overrides = Overrides {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            dir: Some("build".to_string()),
            workers: Some(2),
            access_log: Some(false),
        };
        let cfg = Config::load_from(MISSING_FILE, false, &overrides).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.dir, "build");
        assert_eq!(cfg.server.workers, Some(2));
        assert!(!cfg.logging.access_log);
    }

    #[test]
    fn test_env_lookup() {
        let overrides = Overrides::from_lookup(lookup(&[
            ("HOST", "::1"),
            ("PORT", "8081"),
            ("DIST_DIR", "/srv/app"),
        ]));
        assert_eq!(overrides.host.as_deref(), Some("::1"));
        assert_eq!(overrides.port, Some(8081));
        assert_eq!(overrides.dir.as_deref(), Some("/srv/app"));
    }

    #[test]
    fn test_env_invalid_port_and_empty_values_ignored() {
        let overrides = Overrides::from_lookup(lookup(&[("PORT", "eighty"), ("HOST", "")]));
        assert_eq!(overrides, Overrides::default());
    }

    #[test]
    fn test_cli_wins_over_env() {
        let cli = Cli {
            port: Some(5000),
            quiet: true,
            ..Cli::default()
        };
        let env = Overrides::from_lookup(lookup(&[("PORT", "6000"), ("DIST_DIR", "out")]));
        let merged = Overrides::from_cli(&cli).or(env);
        assert_eq!(merged.port, Some(5000));
        assert_eq!(merged.dir.as_deref(), Some("out"));
        assert_eq!(merged.access_log, Some(false));
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from(MISSING_FILE, false, &Overrides::default()).unwrap();
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:4173".parse().unwrap());

        cfg.server.host = "::1".to_string();
        cfg.server.port = 8080;
        assert_eq!(cfg.socket_addr().unwrap(), "[::1]:8080".parse().unwrap());
    }
}
