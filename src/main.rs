//! site-router
//!
//! Resolves every inbound request to the site configured for its host and
//! port, and serves site information and page URLs over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ site middleware ──▶ handlers
//!                        │                 │                 │
//!                        │                 ▼                 ▼
//!                        │          site resolver      root path cache
//!                        │                 │                 │
//!                        │                 └──▶ site store ◀─┘
//!                        │                          ▲
//!     Admin Request      │                          │
//!     ──────────────▶ admin API ──▶ site manager ───┘ (validate, invalidate)
//!
//!     config watcher ──▶ reseed store + evict root paths
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "site-router")]
#[command(about = "Hostname-based multi-site router", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "site-router.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match site_router::lifecycle::start(&args.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // logging may not be initialized yet
            eprintln!("site-router: {e}");
            ExitCode::FAILURE
        }
    }
}
