//! lite-httpd
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener (plain / TLS)
//!                         │
//!                         ▼
//!                     http server ── request id, timeout, body limit
//!                         │
//!                         ▼
//!                     RequestParams (hostname, port, method, path, ...)
//!                         │
//!                         ▼
//!                     site router ──▶ JSON response
//! ```

use std::path::PathBuf;

use clap::Parser;
use lite_httpd::config::{load_config, ServerConfig};
use lite_httpd::http::HttpServer;
use lite_httpd::lifecycle::{signals, Shutdown};
use lite_httpd::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lite-httpd")]
#[command(about = "Lightweight HTTP server with virtual hosts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("lite-httpd v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        sites = config.sites.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    HttpServer::new(config).serve(server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
