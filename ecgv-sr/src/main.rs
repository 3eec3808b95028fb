//! ecgv-sr - ECG Strip Renderer
//!
//! HTTP service that accepts a 12-lead ECG XML export and answers with a
//! PNG strip chart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use ecgv_common::config::{load_config, ConfigSource};
use ecgv_common::logging::init_tracing;
use ecgv_sr::{build_router, AppState, Rasterizer, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "ecgv-sr")]
#[command(about = "ECG strip chart renderer for ECGView")]
#[command(version)]
struct Args {
    /// Config file (overrides ECGV_CONFIG and the platform location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "ECGV_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ECGV_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging level comes from the config file, so load it first
    let (mut config, source) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging.level);

    info!(
        "Starting ECGView Strip Renderer (ecgv-sr) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &source {
        ConfigSource::Explicit(path) | ConfigSource::Platform(path) => {
            info!("Configuration: {}", path.display())
        }
        ConfigSource::Defaults => warn!("No configuration file found, using compiled defaults"),
    }

    let render = RenderOptions::from_config(&config);
    info!(
        "Rendering at {} dpi, default layout {}",
        render.dpi, render.default_layout
    );

    let rasterizer = Rasterizer::with_system_fonts();
    if rasterizer.font_count() == 0 {
        warn!("No system fonts found, chart text will not be drawn");
    }

    let state = AppState::new(render, rasterizer, config.server.max_upload_bytes);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
