//! dentchat-server: relay between the chat client and the Anthropic API.

mod config;
mod handlers;
mod server;
mod upstream;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::server::{AppState, build_app};
use crate::upstream::AnthropicClient;

#[derive(Parser)]
#[command(name = "dentchat-server", version, about)]
struct Args {
    /// Path to the YAML config file.
    #[arg(long, default_value = "dentchat.yaml")]
    config: PathBuf,

    /// Override the listen host from the config file.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port from the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)
        .await
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let api_key = std::env::var("ANTHROPIC_API_KEY").ok();
    if api_key.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; upstream calls will be unauthenticated");
    }

    let state = AppState {
        upstream: Arc::new(AnthropicClient::new(&config.upstream, api_key)),
    };
    let app = build_app(state, config.server.request_timeout_seconds);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!("listening on {addr}, relaying to {}", config.upstream.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to install ctrl-c handler");
    }
}
