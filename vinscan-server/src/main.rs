use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use vinscan_config::{ServerConfig, logging};
use vinscan_core::store::{JsonFileStore, MemoryStore, RecordStore};
use vinscan_server::{AppState, create_app};

#[derive(Parser, Debug)]
#[command(name = "vinscan-server")]
#[command(about = "Record-store API answering VIN lookups and enrollments")]
struct Args {
    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// JSON file to persist records in (overrides VINSCAN_STORE_PATH)
    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = dotenvy::dotenv().is_ok();
    let args = Args::parse();
    logging::init_logging(logging::SERVER_LOG_DEFAULT);
    if env_file_loaded {
        info!("loaded .env file");
    }

    let mut config = ServerConfig::from_env().context("failed to load server configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(store) = args.store {
        config.store_path = Some(store);
    }

    let store: Arc<dyn RecordStore> = match &config.store_path {
        Some(path) => Arc::new(
            JsonFileStore::open(path)
                .await
                .with_context(|| format!("failed to open record store {}", path.display()))?,
        ),
        None => {
            info!("no VINSCAN_STORE_PATH set; records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = config.bind_addr()?;
    let app = create_app(AppState::new(store, config.api_key.clone()));

    info!(%addr, "starting vinscan server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
