//! # afya-gateway
//!
//! Afya gateway server binary — wires together settings, the rule engine,
//! the optional downstream analysis client, and the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use afya_engine::{AnalysisService, HttpAnalysisService, RuleEngine};
use afya_server::GatewayServer;
use afya_settings::{load_settings, load_settings_from_path};

/// Afya gateway server.
#[derive(Parser, Debug)]
#[command(name = "afya-gateway", about = "Healthcare-insurance chat gateway")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to a settings JSON file.
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_settings().context("failed to load settings")?,
    };
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if settings.auth.secret == "change-me-in-production" {
        warn!("using the built-in development JWT secret; set AFYA_JWT_SECRET before production");
    }

    let analysis: Option<Arc<dyn AnalysisService>> = match &settings.upstream.analysis_url {
        Some(url) => {
            let client = HttpAnalysisService::new(
                url.clone(),
                Duration::from_millis(settings.upstream.timeout_ms),
            )
            .context("failed to build analysis client")?;
            info!(url, "downstream analysis service configured");
            Some(Arc::new(client))
        }
        None => None,
    };

    let metrics = afya_server::metrics::install_recorder();
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let server = GatewayServer::new(settings, Arc::new(RuleEngine::new()), analysis, Some(metrics));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "afya gateway listening");

    axum::serve(
        listener,
        server
            .router()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("afya gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
