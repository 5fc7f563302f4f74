//! oco-ix - annotation metadata service
//!
//! Serves word alignments, pitch contours and viewer parameters for audio
//! files in a flat-file corpus, and persists client-authored spans.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use oco_common::config::{ConfigSource, OcoConfig};
use oco_common::spans::SpanStore;
use oco_common::Annotations;
use oco_ix::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for oco-ix
#[derive(Parser, Debug)]
#[command(name = "oco-ix")]
#[command(about = "Annotation metadata service for flat-file audio corpora")]
#[command(version)]
struct Args {
    /// Corpus root; media keys and the default files resolve against it
    #[arg(short = 'r', long)]
    corpus_root: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "OCO_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(short, long, env = "OCO_BIND_ADDR")]
    bind: Option<String>,

    /// Explicit TOML config file
    #[arg(short, long, env = "OCO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, source) = OcoConfig::load(args.corpus_root.clone(), args.config.as_deref());
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting oco-ix v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &source {
        ConfigSource::File(path) => info!("Config file: {}", path.display()),
        ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
        ConfigSource::Invalid { path, error } => {
            warn!("Ignoring config file {}: {}", path.display(), error)
        }
    }
    config.validate().context("Invalid configuration")?;

    info!("Corpus root: {}", config.corpus_root.display());
    info!("Default metadata files: {}", config.defaults_dir().display());
    info!("Span upload limit: {} bytes", config.max_span_bytes);
    if !config.corpus_root.is_dir() {
        warn!(
            "Corpus root {} is not a directory; every lookup will miss",
            config.corpus_root.display()
        );
    }

    let state = AppState::new(
        Annotations::from_config(&config),
        SpanStore::new(&config.corpus_root),
    )
    .with_max_span_bytes(config.max_span_bytes);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_addr, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("oco-ix listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
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
