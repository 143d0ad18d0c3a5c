use clap::Parser;
use tracing_subscriber::EnvFilter;

use pinbox_api::config::AppConfig;
use pinbox_api::{app, AppState};

#[derive(Parser)]
#[command(name = "pinbox-api")]
#[command(about = "Pinbox API - notes and bookmarks behind bearer-token sessions")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides PINBOX_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides PINBOX_PORT / PORT)")]
    port: Option<u16>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PINBOX_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pinbox_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting Pinbox API in {:?} mode", config.environment);

    let state = AppState::from_config(&config)?;
    let router = app(state, &config);

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Pinbox API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
