//! copilotd — GitHub Copilot metrics exporter.
//!
//! Serves the latest Copilot usage snapshot as Prometheus gauges. The
//! upstream API is called at most once per cache TTL.
//!
//! # Usage
//!
//! ```text
//! GHC_TOKEN=ghp_... ORG=acme copilotd --port 8000
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use copilot_api::{Exporter, ExporterConfig, build_router};
use copilot_fetch::{FetcherConfig, MetricsScope};

#[derive(Parser)]
#[command(name = "copilotd", about = "GitHub Copilot metrics exporter", version)]
struct Cli {
    /// GitHub token with access to the Copilot metrics API.
    #[arg(long, env = "GHC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enterprise (or organization) slug.
    #[arg(long, env = "ORG")]
    org: Option<String>,

    /// Seconds a fetched snapshot stays fresh.
    #[arg(long, env = "CACHE_TTL_SECONDS", default_value = "14400")]
    cache_ttl_secs: u64,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// GitHub API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = copilot_fetch::fetcher::DEFAULT_API_BASE)]
    api_base: String,

    /// Which metrics endpoint to read: `enterprise` or `org`.
    #[arg(long, env = "COPILOT_SCOPE", default_value = "enterprise")]
    scope: MetricsScope,

    /// Upstream request timeout in seconds, 1 to 10.
    #[arg(
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..=10)
    )]
    request_timeout_secs: u64,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,copilotd=debug,copilot=debug")
        });
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("copilot exporter starting");

    let credential = cli.token.filter(|t| !t.is_empty());
    let org = cli.org.filter(|o| !o.is_empty());
    if credential.is_none() {
        warn!("GHC_TOKEN is not set; /metrics will fail until it is");
    }
    if org.is_none() {
        warn!("ORG is not set; /metrics will fail until it is");
    }

    let config = ExporterConfig {
        credential,
        org,
        cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
    };
    let upstream = FetcherConfig {
        api_base: cli.api_base,
        scope: cli.scope,
        timeout: Duration::from_secs(cli.request_timeout_secs),
    };
    info!(
        scope = %upstream.scope,
        api_base = %upstream.api_base,
        ttl_secs = cli.cache_ttl_secs,
        "exporter configured"
    );

    let exporter = Arc::new(Exporter::new(config, upstream)?);
    let router = build_router(exporter);
    let addr = SocketAddr::new(cli.bind, cli.port);

    info!(%addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    info!("copilot exporter stopped");
    Ok(())
}

/// Resolves when `signal` fires. If the signal cannot be listened for, the
/// server keeps running instead of stopping immediately.
async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
