// Command line flags
// Flags take precedence over environment variables and the config file

use clap::Parser;

/// Serve a built single-page application directory
#[derive(Debug, Default, Parser)]
#[command(name = "spa-serve", version, about)]
pub struct Cli {
    /// Host to listen on [env: HOST] [default: 127.0.0.1]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [env: PORT] [default: 4173]
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory to serve, should contain index.html [env: DIST_DIR] [default: dist]
    #[arg(long)]
    pub dir: Option<String>,

    /// Config file path without extension [env: SPA_SERVE_CONFIG]
    #[arg(long)]
    pub config: Option<String>,

    /// Number of runtime worker threads (defaults to CPU cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Disable the access log
    #[arg(long, short)]
    pub quiet: bool,
}
