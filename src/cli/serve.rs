use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use kinship_graph_store::GraphWriter;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::cli::context::{open_store, CliContext};
use crate::metrics;
use crate::server::{build_router, ServeHealth, ServeState};

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Port for the API server (defaults to server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind (defaults to server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// JSON snapshot backing the graph (defaults to storage.data_file)
    #[arg(long = "data-file", value_name = "FILE")]
    pub data_file: Option<PathBuf>,
}

pub async fn cmd_serve(args: ServeArgs, ctx: &CliContext) -> Result<()> {
    let mut config = ctx.config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if args.data_file.is_some() {
        config.storage.data_file = args.data_file;
    }

    metrics::register_metrics();
    let store: Arc<dyn GraphWriter> = open_store(config.storage.data_file.as_deref())?;
    let health = Arc::new(ServeHealth::new());
    let state = ServeState::with_health(Arc::clone(&store), &config, Arc::clone(&health));

    health.mark_live();
    match store.list_users().await {
        Ok(users) => {
            health.mark_ready();
            info!(users = users.len(), "Serve readiness checks passed");
        }
        Err(err) => {
            health.mark_unready(err.to_string());
            error!(?err, "Serve readiness checks failed");
        }
    }

    let router = build_router().with_state(state);

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind API server on {}", addr))?;
    info!(
        %addr,
        metrics_port = ctx.metrics_port(),
        weights = ?config.recommendation.weights(),
        "Kinship API listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server exited unexpectedly")?;
    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
