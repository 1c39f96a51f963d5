//! HTTP server for the spreadsheet-backed record store.
//!
//! Loads configuration, builds the tabular service backend and serves the
//! record API and browser front end until Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sheetdb_api::{router::Router, server::Server};
use sheetdb_core::config::{Backend, Config};
use sheetdb_core::google::GoogleSheets;
use sheetdb_core::memory::MemorySheet;
use sheetdb_core::service::TabularService;
use sheetdb_core::RecordStore;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the record server.
///
/// Flags override the config file and environment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Tabular backend: google or memory
    #[arg(long)]
    backend: Option<Backend>,

    /// Spreadsheet identifier
    #[arg(long)]
    spreadsheet_id: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Upstream (spreadsheet API) timeout in milliseconds
    #[arg(long)]
    upstream_timeout_ms: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(backend) = self.backend {
            config.sheets.backend = backend;
        }
        if let Some(id) = self.spreadsheet_id {
            config.sheets.spreadsheet_id = id;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.server.request_timeout_ms = ms;
        }
        if let Some(ms) = self.upstream_timeout_ms {
            config.sheets.upstream_timeout_ms = ms;
        }
    }
}

fn load_config(args: Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env_overrides()?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn build_service(config: &Config) -> anyhow::Result<Arc<dyn TabularService>> {
    let service: Arc<dyn TabularService> = match config.sheets.backend {
        Backend::Google => Arc::new(GoogleSheets::new(&config.sheets)?),
        Backend::Memory => {
            tracing::warn!("Using the in-memory backend; records are lost on shutdown");
            Arc::new(MemorySheet::new(&config.sheets.layout))
        }
    };
    Ok(service)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config(args)?;
    let service = build_service(&config)?;
    let store = Arc::new(RecordStore::new(service, config.sheets.layout.clone()));
    let router = Router::new(store, Arc::new(config.server.clone()));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let server = Server::new(addr, router);

    tracing::info!(
        backend = ?config.sheets.backend,
        range = %config.sheets.layout.data_range(),
        request_timeout_ms = config.server.request_timeout_ms,
        upstream_timeout_ms = config.sheets.upstream_timeout_ms,
        "Starting record server"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!("Server error: {}", e);
        }
    });

    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    tracing::info!("Shutting down server");
    server_handle.abort();

    Ok(())
}
