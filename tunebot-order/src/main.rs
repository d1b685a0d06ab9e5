//! tunebot-order - music ordering service
//!
//! Serves the QR login page and credential endpoints, and the
//! `send_music_test` tool that searches the music catalog and delivers
//! the top match to a chat through OneBot.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tunebot_common::config::{
    ensure_directory_exists, load_config, resolve_data_dir, CREDENTIAL_FILE_NAME,
};
use tunebot_order::services::{DeliveryConfig, FileSlot, OneBotClient, PollPolicy, QqMusicClient};
use tunebot_order::{build_router, AppState};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "tunebot-order", version, about = "Music ordering service")]
struct Args {
    /// TOML config file
    #[arg(long, env = "TUNEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the persisted credential
    #[arg(long, env = "TUNEBOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP port (overrides the config file)
    #[arg(long, env = "TUNEBOT_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting tunebot-order v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    ensure_directory_exists(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let credential_path = data_dir.join(CREDENTIAL_FILE_NAME);
    info!("Credential file: {}", credential_path.display());

    let delivery_config = DeliveryConfig::try_from(&config)?;
    info!(
        cover_size = delivery_config.cover_size,
        preferred_quality = %delivery_config.preferred_quality,
        "Delivery settings"
    );

    let qqmusic = Arc::new(QqMusicClient::new()?);
    let onebot = Arc::new(OneBotClient::new(&config.onebot)?);
    info!("OneBot API: {}", config.onebot.api_url);

    let state = AppState::new(
        qqmusic.clone(),
        qqmusic,
        onebot,
        Arc::new(FileSlot::new(credential_path)),
        delivery_config,
        PollPolicy::default(),
    );
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", config.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tunebot-order stopped, resources released");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
