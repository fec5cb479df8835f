//! search-proxy server entry point

use anyhow::Result;
use clap::Parser;
use search_proxy::{
    config,
    network::HttpClient,
    providers::ProviderLoader,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Web and code search aggregation proxy
#[derive(Parser)]
#[command(name = "search-proxy", version, about)]
struct Cli {
    /// Path to a settings.yml file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("Starting search-proxy v{}", search_proxy::VERSION);

    let mut settings = config::load(cli.config)?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(bind) = cli.bind {
        settings.server.bind_address = bind;
    }

    let client = HttpClient::with_settings(&settings.outgoing)?;

    let registry = ProviderLoader::load(&settings, &client)?;
    let eligible = registry.eligible();
    if eligible.is_empty() {
        warn!("No search providers configured. Set API keys in environment.");
    } else {
        info!("Providers: {}", eligible.join(", "));
    }

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    let state = AppState::new(&settings, registry, client);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
