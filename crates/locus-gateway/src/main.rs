use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use locus_core::config::LocusConfig;
use locus_gateway::{build_router, AppState};

/// Relay JSON pushed to POST /api/input to every WebSocket subscriber on /ws.
#[derive(Debug, Parser)]
#[command(name = "locus-gateway", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "LOCUS_CONFIG")]
    config: Option<String>,

    /// Override `server.bind`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locus_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config / LOCUS_CONFIG > ./locus.toml, then LOCUS_* env
    let mut config = LocusConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        LocusConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let addr: SocketAddr = config.listen_addr().parse()?;
    let state = Arc::new(AppState::new(config));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Locus relay listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Locus relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler unavailable: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}
