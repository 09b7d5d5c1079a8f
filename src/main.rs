//! Affiliate redirect service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Visitor request        ┌───────────────────────────────────────────────┐
//!     GET /{code}  ─────────▶│  http server ──▶ routing (code → destination) │
//!                            │                        │                      │
//!                            │                        ▼                      │
//!                            │            affiliate::rewrite                 │
//!                            │      matcher ──▶ builder ──▶ page             │
//!                            │                        │                      │
//!     ◀── 200 HTML page ─────│◀── Rewritten ──────────┤                      │
//!     ◀── 302 Location ──────│◀── NotApplicable ──────┘                      │
//!                            │                                               │
//!                            │  settings snapshot ◀── store / watcher / admin│
//!                            └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use affiliate_redirect::config::watcher::SettingsWatcher;
use affiliate_redirect::config::{load_config, ServiceConfig};
use affiliate_redirect::http::HttpServer;
use affiliate_redirect::observability::{logging, metrics};
use affiliate_redirect::settings::{load_or_init, FileSettingsStore, SettingsHandle};

#[derive(Parser)]
#[command(name = "affiliate-redirect")]
#[command(about = "Short-link redirect service with affiliate rewriting", long_about = None)]
struct Args {
    /// Service config file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("affiliate-redirect v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        settings_dir = %config.settings.dir,
        links = config.links.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(FileSettingsStore::new(&config.settings.dir));
    let settings = load_or_init(store.as_ref())?;
    tracing::info!(
        merchants = settings.merchants.len(),
        affiliate_id_set = !settings.affiliate_id.is_empty(),
        "Affiliate settings loaded"
    );
    let handle = SettingsHandle::new(settings);

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = if config.settings.watch {
        Some(SettingsWatcher::new(store.clone(), handle.clone()).run()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store, handle);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
