use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appshell::cache::{CacheClient, MemoryCache, RespCache};
use appshell::config::{self, CacheBackend};
use appshell::http::HttpServer;

#[derive(Parser)]
#[command(name = "appshell")]
#[command(about = "Cache-backed status service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appshell=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("appshell v0.1.0 starting");

    let cli = Cli::parse();
    let config = config::load_config_or_default(cli.config.as_deref())?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_backend = ?config.cache.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let cache: Arc<dyn CacheClient> = match config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Redis => Arc::new(RespCache::new(config.cache.addr.clone())),
    };

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    // Create and run HTTP server
    let server = HttpServer::new(&config, cache);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
