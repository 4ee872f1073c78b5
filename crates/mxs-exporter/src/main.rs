//! mxs-exporter — Prometheus exporter for MaxScale.
//!
//! Serves `/metrics`; every scrape fetches `/v1/servers` and `/v1/services`
//! from the MaxScale REST API and maps their statistics onto gauges.
//!
//! # Usage
//!
//! ```text
//! mxs-exporter --config /etc/mxs-exporter/config.json --port 9104
//! ```
//!
//! Upstream outages never stop the process: the affected resource kind is
//! simply missing from that scrape and `mxs_exporter_scrape_success` drops
//! to 0. Only a bad configuration is fatal.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mxs_metrics::Registry;
use mxs_upstream::{UpstreamClient, UpstreamConfig};

#[derive(Parser, Debug)]
#[command(name = "mxs-exporter", about = "Prometheus exporter for the MaxScale REST API", version)]
struct Cli {
    /// Path to the JSON configuration file (username, password, host, port).
    #[arg(long, alias = "path")]
    config: PathBuf,

    /// Port to serve /metrics on.
    #[arg(long, default_value = "9104")]
    port: u16,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    listen: IpAddr,

    /// Timeout for one upstream request, in seconds.
    #[arg(long, default_value = "10")]
    upstream_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,mxs_exporter=debug,mxs_metrics=debug,mxs_upstream=debug")
        }))
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = UpstreamConfig::from_file(&cli.config).context("loading configuration")?;

    let client = UpstreamClient::new(&config, Duration::from_secs(cli.upstream_timeout))
        .context("building upstream client")?;
    info!(
        upstream = client.base_url(),
        timeout_secs = cli.upstream_timeout,
        "upstream client initialized"
    );

    let registry = Arc::new(Registry::new(Arc::new(client)));
    info!(metrics = registry.describe().len(), "metric registry initialized");

    let router = mxs_api::build_router(registry);
    let addr = SocketAddr::new(cli.listen, cli.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "serving /metrics");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    }
}
